//! JSON-file backed credential store.
//!
//! The whole key/value map lives in one JSON object. Every mutation loads
//! the file, applies the change and atomically replaces the file (temp file
//! + rename), so a batch written with `set_many` is never half-applied on
//! disk.

use crate::{CredentialStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, warn};

type Entries = BTreeMap<String, String>;

/// Credential store persisted to a single JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store backed by `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> StorageResult<Entries> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            StorageError::Encoding(format!("{}: {}", self.path.display(), e))
        })
    }

    /// Load for a read-modify-write cycle. An unreadable file is moved aside
    /// to `<name>.corrupt` and the cycle starts from an empty map, so the
    /// next write repairs the store.
    async fn load_for_write(&self) -> StorageResult<Entries> {
        match self.load().await {
            Err(StorageError::Encoding(reason)) => {
                let aside = self.sibling_path(".corrupt");
                warn!(
                    path = %self.path.display(),
                    error = %reason,
                    "Credential file is unreadable; starting from an empty store"
                );
                if let Err(e) = tokio::fs::rename(&self.path, &aside).await {
                    warn!(error = %e, "Failed to move corrupt credential file aside");
                }
                Ok(Entries::new())
            }
            other => other,
        }
    }

    async fn persist(&self, entries: &Entries) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError::Encoding(e.to_string()))?;

        let tmp_path = self.sibling_path(".tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(path = %self.path.display(), keys = entries.len(), "Credential file written");
        Ok(())
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_write().await?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await
    }

    async fn set_many(&self, batch: &[(&str, String)]) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_write().await?;
        for (key, value) in batch {
            entries.insert(key.to_string(), value.clone());
        }
        self.persist(&entries).await
    }

    async fn remove(&self, keys: &[&str]) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load_for_write().await?;
        let before = entries.len();
        for key in keys {
            entries.remove(*key);
        }
        if entries.len() == before {
            return Ok(());
        }
        self.persist(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));

        assert_eq!(store.get("auth_complete").await.unwrap(), None);
        assert!(!store.has("auth_complete").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_many_then_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileCredentialStore::new(&path);
        store
            .set_many(&[
                ("auth_complete", "true".to_string()),
                ("profile_complete", "true".to_string()),
            ])
            .await
            .unwrap();

        let reopened = FileCredentialStore::new(&path);
        assert_eq!(
            reopened.get("auth_complete").await.unwrap(),
            Some("true".to_string())
        );
        assert_eq!(
            reopened.get("profile_complete").await.unwrap(),
            Some("true".to_string())
        );
        assert!(!dir.path().join("nested").join("credentials.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));

        store.set("carousel_seen", "true").await.unwrap();
        store.set("user_record", "{}").await.unwrap();
        store.remove(&["user_record", "auth_complete"]).await.unwrap();

        assert_eq!(store.get("user_record").await.unwrap(), None);
        assert_eq!(
            store.get("carousel_seen").await.unwrap(),
            Some("true".to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_encoding_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = FileCredentialStore::new(&path);
        match store.get("auth_complete").await {
            Err(StorageError::Encoding(_)) => {}
            other => panic!("Expected encoding error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_repairs_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "{truncated").unwrap();

        let store = FileCredentialStore::new(&path);
        store.set("carousel_seen", "true").await.unwrap();

        assert_eq!(
            store.get("carousel_seen").await.unwrap(),
            Some("true".to_string())
        );
        let aside = dir.path().join("credentials.json.corrupt");
        assert_eq!(std::fs::read_to_string(aside).unwrap(), "{truncated");
    }

    #[tokio::test]
    async fn test_remove_on_corrupt_file_does_not_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let store = FileCredentialStore::new(&path);
        store.remove(&["user_record"]).await.unwrap();
        store
            .set_many(&[("auth_complete", "false".to_string())])
            .await
            .unwrap();

        assert_eq!(
            store.get("auth_complete").await.unwrap(),
            Some("false".to_string())
        );
    }
}
