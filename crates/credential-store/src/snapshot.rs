//! High-level API for the persisted session snapshot.

use crate::{CredentialStore, StorageKeys, StorageResult};
use std::sync::Arc;

const TRUE: &str = "true";
const FALSE: &str = "false";

/// Raw persisted snapshot, as read from the store in one logical read.
///
/// Flags are decoded leniently: anything other than the literal `"true"`
/// counts as false. The user record is kept as raw JSON; decoding it is the
/// caller's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSnapshot {
    pub auth_complete: Option<bool>,
    pub profile_complete: Option<bool>,
    pub user_record: Option<String>,
    pub carousel_seen: bool,
}

fn parse_flag(raw: Option<String>) -> Option<bool> {
    raw.map(|value| value.trim() == TRUE)
}

fn flag(value: bool) -> String {
    let raw = if value { TRUE } else { FALSE };
    raw.to_string()
}

/// Reads and writes the session snapshot keys on a [`CredentialStore`].
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn CredentialStore>,
}

impl SnapshotStore {
    /// Wrap a store.
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Read all snapshot keys.
    ///
    /// The four reads run concurrently and are collected before anything is
    /// returned; a failure of any single read fails the whole snapshot.
    pub async fn read(&self) -> StorageResult<PersistedSnapshot> {
        let (auth, profile, user, carousel) = tokio::try_join!(
            self.store.get(StorageKeys::AUTH_COMPLETE),
            self.store.get(StorageKeys::PROFILE_COMPLETE),
            self.store.get(StorageKeys::USER_RECORD),
            self.store.get(StorageKeys::CAROUSEL_SEEN),
        )?;

        Ok(PersistedSnapshot {
            auth_complete: parse_flag(auth),
            profile_complete: parse_flag(profile),
            user_record: user,
            carousel_seen: parse_flag(carousel).unwrap_or(false),
        })
    }

    /// Write both session flags and the user record in one batch.
    pub async fn write_session(
        &self,
        auth_complete: bool,
        profile_complete: bool,
        user_record_json: String,
    ) -> StorageResult<()> {
        self.store
            .set_many(&[
                (StorageKeys::AUTH_COMPLETE, flag(auth_complete)),
                (StorageKeys::PROFILE_COMPLETE, flag(profile_complete)),
                (StorageKeys::USER_RECORD, user_record_json),
            ])
            .await
    }

    /// Remove the account session keys. The onboarding flag is kept.
    pub async fn clear_session(&self) -> StorageResult<()> {
        self.store.remove(&StorageKeys::SESSION_KEYS).await
    }

    /// Persist the onboarding flag.
    pub async fn set_carousel_seen(&self) -> StorageResult<()> {
        self.store.set(StorageKeys::CAROUSEL_SEEN, TRUE).await
    }
}
