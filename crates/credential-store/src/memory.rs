//! In-memory credential store.

use crate::{CredentialStore, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local store. Nothing survives a restart unless the same instance
/// is handed to the next controller.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: Mutex::new(data),
        }
    }

    /// Copy of the current contents.
    pub fn entries(&self) -> HashMap<String, String> {
        self.data.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_many(&self, entries: &[(&str, String)]) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in entries {
            data.insert(key.to_string(), value.clone());
        }
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> StorageResult<()> {
        let mut data = self.data.lock().unwrap_or_else(|e| e.into_inner());
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}
