// ABOUTME: The StorageBackend trait: a string key-value primitive the record store persists through.
// ABOUTME: Includes MemoryBackend, an in-process map with an optional byte quota for tests.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage quota exceeded: write needs {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },
}

/// A persistent map from string keys to UTF-8 string values. A `set` replaces
/// the whole value in one step; a failed `set` leaves the old value in place.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;

    fn keys(&self) -> Result<Vec<String>, BackendError>;
}

impl<B: StorageBackend + ?Sized> StorageBackend for Box<B> {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        (**self).keys()
    }
}

/// In-memory backend. With a quota it behaves like browser storage: the quota
/// counts key and value bytes, and a write that would exceed it is refused.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        if let Some(quota) = self.quota_bytes {
            let replaced = self.entries.get(key).map_or(0, |old| key.len() + old.len());
            let available = quota.saturating_sub(self.used_bytes() - replaced);
            let needed = key.len() + value.len();
            if needed > available {
                return Err(BackendError::QuotaExceeded { needed, available });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, BackendError> {
        Ok(self.entries.keys().cloned().collect())
    }
}
