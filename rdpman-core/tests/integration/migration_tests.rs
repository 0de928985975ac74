//! Background migration of legacy records

use std::sync::{Arc, Mutex};

use rdpman_core::{ConnectionStore, CredentialStore, MigrationReport};
use serde_json::json;

use super::Backends;

fn store_with_hook(backends: &Backends) -> (ConnectionStore, Arc<Mutex<Vec<MigrationReport>>>) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reports);
    let store = ConnectionStore::new(backends.ctx.clone())
        .with_migration_hook(Arc::new(move |report| sink.lock().unwrap().push(report)));
    (store, reports)
}

async fn seed_credential(backends: &Backends, id: &str, username: &str) {
    use rdpman_core::BlobStore;
    backends
        .blobs
        .update(
            "rdpman:credential",
            json!([{"id": id, "username": username, "createdAt": "2024-01-01T00:00:00.000Z"}]),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn username_reference_and_snake_case_timestamp_are_migrated() {
    let backends = Backends::with_connections(json!([{
        "id": "c1",
        "hostname": "h",
        "credentialUsername": "alice",
        "created_at": "2024-01-01"
    }]));
    seed_credential(&backends, "cred-1", "alice").await;
    let (store, reports) = store_with_hook(&backends);

    // The read returns the data as stored
    let snapshot = store.get_all().await.unwrap();
    assert_eq!(snapshot[0].credential_id, None);
    assert_eq!(
        snapshot[0].legacy.credential_username.as_deref(),
        Some("alice")
    );

    store.wait_for_migrations().await;
    assert_eq!(
        backends.stored_connections().await,
        json!([{"id": "c1", "hostname": "h", "credentialId": "cred-1", "createdAt": "2024-01-01"}])
    );

    let reports = reports.lock().unwrap().clone();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].examined, 1);
    assert_eq!(reports[0].migrated, 1);
    assert!(reports[0].persisted);
    assert!(reports[0].failed.is_none());
}

#[tokio::test]
async fn second_pass_finds_nothing_to_do() {
    let backends = Backends::with_connections(json!([
        {"id": "c1", "hostname": "a", "credentialId": "alice"},
        {"id": "c2", "hostname": "b", "credentialId": "ghost"},
        {"id": "c3", "hostname": "c", "credentialId": "dead-beef-0000"},
        {"id": "c4", "hostname": "d", "credentialUsername": "nobody", "modified_at": "2024-02-02"}
    ]));
    seed_credential(&backends, "k-1", "alice").await;
    let (store, reports) = store_with_hook(&backends);

    store.get_all().await.unwrap();
    store.wait_for_migrations().await;
    let writes = backends.blobs.write_count();

    let migrated = store.get_all().await.unwrap();
    store.wait_for_migrations().await;

    assert_eq!(backends.blobs.write_count(), writes);
    let reports = reports.lock().unwrap().clone();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].migrated, 4);
    assert_eq!(reports[1].migrated, 0);
    assert!(!reports[1].persisted);

    let by_id = |id: &str| migrated.iter().find(|c| c.id == id).unwrap().clone();
    assert_eq!(by_id("c1").credential_id.as_deref(), Some("k-1"));
    assert_eq!(by_id("c2").credential_id, None);
    // Looks like a generated id, so it is left alone
    assert_eq!(by_id("c3").credential_id.as_deref(), Some("dead-beef-0000"));
    let c4 = by_id("c4");
    assert!(c4.legacy.is_empty());
    assert_eq!(c4.modified_at.as_deref(), Some("2024-02-02"));
    assert!(migrated.iter().all(|c| c.created_at.is_some()));
}

#[tokio::test]
async fn failed_migration_is_reported_to_the_hook() {
    let backends = Backends::with_connections(json!([{"id": "c1", "hostname": "h"}]));
    {
        use rdpman_core::BlobStore;
        backends
            .blobs
            .update("rdpman:credential", json!("not a list"))
            .await
            .unwrap();
    }
    let (store, reports) = store_with_hook(&backends);

    assert_eq!(store.get_all().await.unwrap().len(), 1);
    store.wait_for_migrations().await;

    let reports = reports.lock().unwrap().clone();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].failed.is_some());
    assert!(!reports[0].persisted);
}

#[tokio::test]
async fn credential_metadata_gets_camel_case_timestamps() {
    let backends = Backends::empty();
    {
        use rdpman_core::BlobStore;
        backends
            .blobs
            .update(
                "rdpman:credential",
                json!([
                    {"id": "k-1", "username": "alice", "created_at": "2023-05-05"},
                    {"id": "k-2", "username": "bob"}
                ]),
            )
            .await
            .unwrap();
    }
    let credentials = CredentialStore::new(backends.ctx.clone());

    let listed = credentials.list_metadata().await.unwrap();
    assert_eq!(listed[0].created_at.as_deref(), Some("2023-05-05"));
    assert!(listed[0].legacy.created_at.is_none());
    assert!(listed[1].created_at.is_some());

    let stored = backends.blobs.snapshot("rdpman:credential").await.unwrap();
    assert_eq!(stored[0]["createdAt"], "2023-05-05");
    assert!(stored[0].get("created_at").is_none());

    let writes = backends.blobs.write_count();
    credentials.list_metadata().await.unwrap();
    assert_eq!(backends.blobs.write_count(), writes);
}
