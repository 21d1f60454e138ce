//! Persisted key/value storage for the SafeRoute session.
//!
//! This crate provides:
//! - the [`CredentialStore`] trait the session controller persists through
//! - **memory**: a process-local store for tests and ephemeral sessions
//! - **file**: a JSON-file store with atomic batch writes
//! - [`SnapshotStore`], the typed read/write API over the snapshot keys

mod file;
mod keys;
mod memory;
mod snapshot;
mod traits;

pub use file::FileCredentialStore;
pub use keys::StorageKeys;
pub use memory::MemoryCredentialStore;
pub use snapshot::{PersistedSnapshot, SnapshotStore};
pub use traits::CredentialStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Platform storage error: {0}")]
    Platform(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
