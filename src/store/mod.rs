//! Flat-file persistence for the dashboard document.
//!
//! The whole application state lives in one JSON file. Every mutation is a
//! read-modify-write of the entire document under a single lock, so the
//! last writer wins; there is no finer-grained locking and none is needed
//! for a single local user.

use std::{
    fs, io,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{ActiveSession, Note, Stats, Task, UserProfile},
};

/// The persisted JSON document, in its entirety.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub user: UserProfile,
    #[serde(default)]
    pub stats: Stats,
    /// The synced timer state, absent when no countdown is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_session: Option<ActiveSession>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Narrow single-row interface the session tracker is injected with.
///
/// Only the four lifecycle commands go through this trait, which keeps the
/// tracker testable against an in-memory substitute.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Option<ActiveSession>;
    fn put(&self, session: ActiveSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

impl<S: SessionStore> SessionStore for Arc<S> {
    fn get(&self) -> Option<ActiveSession> {
        (**self).get()
    }

    fn put(&self, session: ActiveSession) -> Result<()> {
        (**self).put(session)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// JSON-file backed store holding the document in memory and writing the
/// whole file through on every update.
pub struct DataStore {
    path: PathBuf,
    data: RwLock<Document>,
}

impl DataStore {
    /// Open the store at `path`, falling back to the default document when
    /// the file is missing or unreadable.
    pub fn open(path: PathBuf) -> Self {
        let data = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(doc) => doc,
                Err(err) => {
                    warn!(
                        "Malformed data file {}, starting from defaults: {err}",
                        path.display()
                    );
                    Document::default()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No data file at {}, starting fresh", path.display());
                Document::default()
            }
            Err(err) => {
                warn!(
                    "Could not read data file {}, starting from defaults: {err}",
                    path.display()
                );
                Document::default()
            }
        };

        Self {
            path,
            data: RwLock::new(data),
        }
    }

    /// Current document, cloned out from under the lock.
    pub fn snapshot(&self) -> Document {
        self.data.read().unwrap().clone()
    }

    /// Apply `f` to the document and persist the result. The closure's
    /// return value is handed back so callers can report what changed.
    ///
    /// The mutation runs against a draft and is committed to the in-memory
    /// document only once the file write succeeds, so a failed write leaves
    /// memory and disk agreeing and the caller can retry the whole command
    /// without double-applying it.
    pub fn update<T>(&self, f: impl FnOnce(&mut Document) -> T) -> Result<T> {
        let mut guard = self.data.write().unwrap();
        let mut draft = guard.clone();
        let out = f(&mut draft);
        self.persist(&draft)?;
        *guard = draft;
        Ok(out)
    }

    /// Like [`DataStore::update`], but persists only when the closure
    /// reports a change by returning `Some`. Lets lookup-then-edit callers
    /// leave the file untouched when the target row does not exist.
    pub fn update_if<T>(&self, f: impl FnOnce(&mut Document) -> Option<T>) -> Result<Option<T>> {
        let mut guard = self.data.write().unwrap();
        let mut draft = guard.clone();
        match f(&mut draft) {
            Some(out) => {
                self.persist(&draft)?;
                *guard = draft;
                Ok(Some(out))
            }
            None => Ok(None),
        }
    }

    fn persist(&self, doc: &Document) -> Result<()> {
        let serialized = serde_json::to_string_pretty(doc)?;
        fs::write(&self.path, serialized)?;
        Ok(())
    }
}

impl SessionStore for DataStore {
    fn get(&self) -> Option<ActiveSession> {
        self.data.read().unwrap().active_session.clone()
    }

    fn put(&self, session: ActiveSession) -> Result<()> {
        self.update(|doc| doc.active_session = Some(session))
    }

    fn clear(&self) -> Result<()> {
        self.update(|doc| doc.active_session = None)
    }
}

/// In-memory session row for tests, counting writes so tests can assert
/// which commands actually touched the store.
#[cfg(test)]
#[derive(Default, Clone)]
pub(crate) struct MemoryStore {
    session: Arc<std::sync::Mutex<Option<ActiveSession>>>,
    clears: Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn clear_count(&self) -> usize {
        self.clears.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl SessionStore for MemoryStore {
    fn get(&self) -> Option<ActiveSession> {
        self.session.lock().unwrap().clone()
    }

    fn put(&self, session: ActiveSession) -> Result<()> {
        *self.session.lock().unwrap() = Some(session);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.session.lock().unwrap() = None;
        self.clears
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}
