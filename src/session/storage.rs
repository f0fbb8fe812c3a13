use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::types::UserProfile;

/// The three persisted session keys, always written and cleared as one record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl StoredCredentials {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt credential record: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value storage for the session record.
///
/// Implementations must make `save` and `clear` all-or-nothing: after
/// either call returns, a `load` sees the whole new record or the whole
/// old one.
pub trait CredentialStorage: Send + Sync {
    /// Read the persisted record. A missing record is an empty one.
    fn load(&self) -> Result<StoredCredentials, StorageError>;

    /// Replace the persisted record.
    fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError>;

    /// Remove every persisted key.
    fn clear(&self) -> Result<(), StorageError>;
}

/// Single JSON file, replaced atomically (write to temp, then rename).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CredentialStorage for FileStorage {
    fn load(&self) -> Result<StoredCredentials, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredCredentials::default()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(credentials)?;

        let parent = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent).map_err(|e| self.io_error(e))?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| self.io_error(e))?;
        temp.write_all(&content).map_err(|e| self.io_error(e))?;
        temp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        temp.persist(&self.path).map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process storage, for tests and embedders without a filesystem.
///
/// Writes can be made to fail with [`set_fail_writes`](Self::set_fail_writes),
/// or only clears with [`set_fail_clear`](Self::set_fail_clear).
#[derive(Debug, Default)]
pub struct MemoryStorage {
    record: Mutex<StoredCredentials>,
    fail_writes: AtomicBool,
    fail_clear: AtomicBool,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_record(record: StoredCredentials) -> Self {
        Self {
            record: Mutex::new(record),
            fail_writes: AtomicBool::new(false),
            fail_clear: AtomicBool::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }

    /// Current record, bypassing the trait.
    #[must_use]
    pub fn record(&self) -> StoredCredentials {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

impl CredentialStorage for MemoryStorage {
    fn load(&self) -> Result<StoredCredentials, StorageError> {
        Ok(self.record())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), StorageError> {
        self.check_writable()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = credentials.clone();
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.check_writable()?;
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("clear disabled".into()));
        }
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = StoredCredentials::default();
        Ok(())
    }
}
