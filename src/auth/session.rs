//! Session persistence
//!
//! The session (token plus a cached copy of the user) survives restarts
//! through a [`SessionStorage`] backend. [`SessionHandle`] is the shared,
//! in-memory view that the API client reads tokens from and that the auth
//! store writes to.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

use super::types::User;
use crate::error::{Error, Result};

/// Session data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Backend that keeps the session between runs
pub trait SessionStorage: Send + Sync {
    /// Read the stored session. `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<Session>>;

    fn save(&self, session: &Session) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Storage that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorage {
    session: Mutex<Option<Session>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>> {
        let guard = self
            .session
            .lock()
            .map_err(|_| Error::storage("session lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| Error::storage("session lock poisoned"))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| Error::storage("session lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

/// Storage backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str::<Session>(&contents).map_err(|e| {
            Error::storage(format!("invalid session file {}: {}", self.path.display(), e))
        })?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_vec_pretty(session)?;
        fs::write(&self.path, json)?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Shared current session plus its persistent copy
#[derive(Clone)]
pub struct SessionHandle {
    current: Arc<RwLock<Option<Session>>>,
    storage: Arc<dyn SessionStorage>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionHandle {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            storage,
        }
    }

    /// A handle with nothing persisted, for tests and one-off scripts
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn get(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.get().map(|s| s.token)
    }

    pub fn user(&self) -> Option<User> {
        self.get().map(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }

    /// Replace the session in memory, and in storage when `persist` is set
    pub fn set(&self, session: Session, persist: bool) -> Result<()> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
        if persist {
            self.storage.save(&session)?;
        }
        Ok(())
    }

    /// Drop the session from memory and storage.
    ///
    /// Memory is always cleared, even if removing the stored copy fails.
    pub fn clear(&self) -> Result<()> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.storage.clear()
    }

    /// Load the stored session into memory.
    ///
    /// With nothing stored, the session already held in memory is kept and
    /// returned. A stored session that cannot be read is removed.
    pub fn restore(&self) -> Option<Session> {
        match self.storage.load() {
            Ok(Some(session)) => {
                *self
                    .current
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session.clone());
                Some(session)
            }
            Ok(None) => self.get(),
            Err(e) => {
                warn!("discarding unreadable session: {}", e);
                if let Err(e) = self.clear() {
                    warn!("failed to clear session storage: {}", e);
                }
                None
            }
        }
    }
}
