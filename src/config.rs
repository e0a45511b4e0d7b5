// ABOUTME: Configuration loading for the gymstore binary.
// ABOUTME: Reads GYM_* environment variables and opens the storage backend they select.

use std::path::PathBuf;

use gym_store::{FileBackend, MemoryBackend, SqliteBackend, StorageBackend};
use thiserror::Error;

/// File name of the SQLite database inside the data directory.
pub const SQLITE_FILE: &str = "gym.db";

/// Subdirectory of the data directory used by the file backend.
pub const FILE_DIR: &str = "data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GYM_BACKEND must be one of file, sqlite, memory; got {0:?}")]
    InvalidBackend(String),

    #[error("GYM_QUOTA_BYTES is not a valid byte count: {0:?}")]
    InvalidQuota(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    File,
    Sqlite,
    Memory,
}

impl BackendKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidBackend(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GymConfig {
    pub home: PathBuf,
    pub backend: BackendKind,
    pub quota_bytes: Option<usize>,
}

impl GymConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - GYM_HOME: data directory (default: ~/.gymstore)
    /// - GYM_BACKEND: file, sqlite or memory (default: file)
    /// - GYM_QUOTA_BYTES: byte quota for the memory backend (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var("GYM_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".gymstore")
            });

        let backend = match std::env::var("GYM_BACKEND") {
            Ok(value) if !value.is_empty() => BackendKind::parse(&value)?,
            _ => BackendKind::File,
        };

        let quota_bytes = match std::env::var("GYM_QUOTA_BYTES") {
            Ok(value) if !value.is_empty() => Some(
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidQuota(value.clone()))?,
            ),
            _ => None,
        };

        Ok(Self {
            home,
            backend,
            quota_bytes,
        })
    }

    /// Open the configured backend. The quota only applies to memory storage.
    pub fn open_backend(&self) -> anyhow::Result<Box<dyn StorageBackend>> {
        let backend: Box<dyn StorageBackend> = match self.backend {
            BackendKind::File => Box::new(FileBackend::open(&self.home.join(FILE_DIR))?),
            BackendKind::Sqlite => Box::new(SqliteBackend::open(&self.home.join(SQLITE_FILE))?),
            BackendKind::Memory => match self.quota_bytes {
                Some(quota) => Box::new(MemoryBackend::with_quota(quota)),
                None => Box::new(MemoryBackend::new()),
            },
        };
        if self.quota_bytes.is_some() && self.backend != BackendKind::Memory {
            tracing::warn!("GYM_QUOTA_BYTES ignored for {:?} backend", self.backend);
        }
        Ok(backend)
    }
}
