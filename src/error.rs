use uuid::Uuid;

/// Failure taxonomy for the dashboard.
///
/// A read that hits a missing or malformed data file is not an error; the
/// store recovers by substituting the default document. Write failures do
/// surface as [`Error::Store`] and callers are expected to retry the whole
/// command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("store unavailable: {0}")]
    Store(#[from] std::io::Error),

    #[error("store unavailable: could not encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no {0} with id {1}")]
    NotFound(&'static str, Uuid),
}

pub type Result<T> = std::result::Result<T, Error>;
