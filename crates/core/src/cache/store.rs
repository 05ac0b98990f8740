//! Key-value storage behind the cache.
//!
//! The cache boundary is a synchronous get/set interface scoped to one
//! client. Two backends are provided: an in-memory map (tests, ephemeral
//! sessions) and a directory with one JSON file per key.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};

use crate::errors::{CacheError, Result};

/// Synchronous key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Contents are lost when the store is dropped.
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the entries, recovering from poison. A poisoned map still
    /// holds complete values since every write is a single insert.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Key-value store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl KeyValueStore for InMemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock_entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock_entries()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed store: one `<key>.json` file per key under a directory.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash mid-write leaves the previous value in place.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| CacheError::WriteFailed {
            key: dir.display().to_string(),
            message: e.to_string(),
        })?;
        debug!("File key-value store opened at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::ReadFailed {
                key: key.to_string(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let write_failed = |e: std::io::Error| CacheError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        };

        fs::write(&tmp, value).map_err(write_failed)?;
        fs::rename(&tmp, &path).map_err(write_failed)?;
        Ok(())
    }
}
