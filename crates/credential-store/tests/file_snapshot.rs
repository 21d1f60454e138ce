use credential_store::{FileCredentialStore, SnapshotStore, StorageKeys};
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn snapshot_survives_reopening_the_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    {
        let snapshots = SnapshotStore::new(Arc::new(FileCredentialStore::new(&path)));
        snapshots.set_carousel_seen().await.unwrap();
        snapshots
            .write_session(true, true, r#"{"uid":"u-1","email":"a@b.com"}"#.to_string())
            .await
            .unwrap();
    }

    let snapshots = SnapshotStore::new(Arc::new(FileCredentialStore::new(&path)));
    let snapshot = snapshots.read().await.unwrap();
    assert_eq!(snapshot.auth_complete, Some(true));
    assert_eq!(snapshot.profile_complete, Some(true));
    assert!(snapshot.carousel_seen);
    assert!(snapshot.user_record.unwrap().contains("a@b.com"));
}

#[tokio::test]
async fn clearing_session_leaves_only_onboarding_flag_on_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let snapshots = SnapshotStore::new(Arc::new(FileCredentialStore::new(&path)));

    snapshots.set_carousel_seen().await.unwrap();
    snapshots
        .write_session(false, false, "{}".to_string())
        .await
        .unwrap();
    snapshots.clear_session().await.unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let on_disk: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(on_disk.len(), 1);
    assert!(on_disk.contains_key(StorageKeys::CAROUSEL_SEEN));
}
