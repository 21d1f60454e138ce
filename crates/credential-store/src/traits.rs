//! Storage trait definitions.

use crate::StorageResult;
use async_trait::async_trait;

/// Trait for persisted key/value backends holding the session snapshot.
///
/// Values are plain strings; structured values are JSON-encoded by callers.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a value
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Store several values as one write.
    ///
    /// Backends that can apply the batch atomically should override this;
    /// the default applies entries one by one.
    async fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Remove several keys. Missing keys are not an error.
    async fn remove(&self, keys: &[&str]) -> StorageResult<()>;

    /// Check if a key exists
    async fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
