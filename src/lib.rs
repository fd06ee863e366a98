pub mod error;
pub mod models;
pub mod server;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};
