// ABOUTME: Persistence layer for gymstore, storing record collections in a key-value backend.
// ABOUTME: Provides memory, file, and SQLite backends, the whole-collection RecordStore, and session auth.

pub mod auth;
pub mod backend;
pub mod file;
pub mod sqlite;
pub mod store;

pub use auth::{Auth, AuthError, session_key};
pub use backend::{BackendError, MemoryBackend, StorageBackend};
pub use file::FileBackend;
pub use sqlite::SqliteBackend;
pub use store::{KEY_PREFIX, RecordStore, StoreError, collection_key};
