//! Store round trips, uniqueness, cascades and bounds

use std::sync::Arc;

use async_trait::async_trait;
use rdpman_core::error::{StoreError, StoreResult, ValidationError};
use rdpman_core::storage::{FileSecretVault, JsonFileBlobStore};
use rdpman_core::{
    BlobStore, ConnectionStore, CredentialStore, MemorySecretVault, SecretVault, StoreContext,
};
use serde_json::{Value, json};
use tempfile::TempDir;

use super::Backends;

#[tokio::test]
async fn created_records_read_back_with_password_outside_blob_store() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());

    let cred_id = credentials.create("alice", "s3cret").await.unwrap();
    let conn_id = connections
        .create("srv01", Some(&cred_id), Some("Lab"))
        .await
        .unwrap();

    let all = connections.get_all().await.unwrap();
    connections.wait_for_migrations().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, conn_id);
    assert_eq!(all[0].hostname, "srv01");
    assert_eq!(all[0].group.as_deref(), Some("Lab"));
    assert_eq!(all[0].credential_id.as_deref(), Some(cred_id.as_str()));
    assert!(all[0].created_at.is_some());

    let resolved = credentials
        .get_with_password_by_id(&cred_id)
        .await
        .unwrap()
        .expect("credential with password");
    assert_eq!(resolved.username, "alice");
    assert_eq!(resolved.expose_password(), "s3cret");

    let metadata = backends.blobs.snapshot("rdpman:credential").await.unwrap();
    assert!(!metadata.to_string().contains("s3cret"));
    assert_eq!(
        backends
            .secrets
            .get(&format!("rdpman.credential.secret.{cred_id}"))
            .await
            .unwrap()
            .as_deref(),
        Some("s3cret")
    );
}

#[tokio::test]
async fn duplicates_are_rejected_without_writing() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());

    let cred_id = credentials.create("alice", "pw").await.unwrap();
    connections.create("srv01", Some(&cred_id), None).await.unwrap();
    let blob_writes = backends.blobs.write_count();
    let secret_writes = backends.secrets.write_count();

    let err = credentials.create("alice", "other").await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateCredential(ref u) if u == "alice"));

    let err = connections
        .create("srv01", Some(&cred_id), Some("Elsewhere"))
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    assert_eq!(backends.blobs.write_count(), blob_writes);
    assert_eq!(backends.secrets.write_count(), secret_writes);

    // Same host with another credential is a different connection
    connections.create("srv01", None, None).await.unwrap();
    assert_eq!(connections.get_all().await.unwrap().len(), 2);
    connections.wait_for_migrations().await;
}

#[tokio::test]
async fn deleting_a_credential_clears_only_its_references() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());

    let alice = credentials.create("alice", "pw-a").await.unwrap();
    let bob = credentials.create("bob", "pw-b").await.unwrap();
    let c1 = connections.create("h1", Some(&alice), None).await.unwrap();
    let c2 = connections.create("h2", Some(&bob), None).await.unwrap();

    assert_eq!(connections.clear_credential_reference(&alice).await.unwrap(), 1);
    assert!(credentials.delete(&alice).await.unwrap());
    assert!(!credentials.delete(&alice).await.unwrap());

    let first = connections.get_by_id(&c1).await.unwrap().unwrap();
    let second = connections.get_by_id(&c2).await.unwrap().unwrap();
    assert_eq!(first.credential_id, None);
    assert!(first.modified_at.is_some());
    assert_eq!(second.credential_id.as_deref(), Some(bob.as_str()));
    assert!(second.modified_at.is_none());

    assert!(
        backends
            .secrets
            .get(&format!("rdpman.credential.secret.{alice}"))
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(backends.secrets.len().await, 1);
}

#[tokio::test]
async fn length_bounds_are_enforced_before_writing() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());

    let err = connections
        .create(&"h".repeat(256), None, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::TooLong {
            max: 255,
            actual: 256,
            ..
        })
    ));

    let err = credentials
        .create("alice", &"p".repeat(1001))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::TooLong { max: 1000, .. })
    ));

    let err = credentials.create("", "pw").await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::Empty { .. })
    ));
    assert_eq!(backends.blobs.write_count(), 0);
    assert_eq!(backends.secrets.write_count(), 0);

    connections
        .create(&"h".repeat(255), None, Some(&"g".repeat(255)))
        .await
        .unwrap();
    credentials
        .create(&"u".repeat(255), &"p".repeat(1000))
        .await
        .unwrap();
}

#[tokio::test]
async fn updating_a_credential_keeps_its_id_and_references() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());

    let id = credentials.create("alice", "old").await.unwrap();
    let conn = connections.create("srv", Some(&id), None).await.unwrap();
    credentials.update(&id, "alice2", "new").await.unwrap();

    let credential = credentials.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(credential.username, "alice2");
    assert_eq!(credential.expose_password(), "new");
    assert!(credential.modified_at.is_some());

    let connection = connections.get_by_id(&conn).await.unwrap().unwrap();
    assert_eq!(connection.credential_id.as_deref(), Some(id.as_str()));

    let err = credentials.update("missing", "x", "y").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn malformed_collection_is_rejected_on_read() {
    let backends = Backends::with_connections(json!([{"id": 7, "hostname": "h"}]));
    let connections = ConnectionStore::new(backends.ctx.clone());

    assert!(matches!(
        connections.get_all().await,
        Err(StoreError::InvalidConnectionData)
    ));
    assert!(matches!(
        connections.create("h2", None, None).await,
        Err(StoreError::InvalidConnectionData)
    ));
    assert_eq!(backends.blobs.write_count(), 0);
}

/// Blob store that hands back something else than what was written
#[derive(Debug, Default)]
struct CorruptingBlobStore;

#[async_trait]
impl BlobStore for CorruptingBlobStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<Value>> {
        Ok(Some(json!({"not": "an array"})))
    }

    async fn update(&self, _key: &str, _value: Value) -> StoreResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn write_is_checked_by_reading_it_back() {
    let ctx = StoreContext::new(
        Arc::new(CorruptingBlobStore),
        Arc::new(MemorySecretVault::new()),
    );
    let connections = ConnectionStore::new(ctx);

    let err = connections.update_all(&[]).await.unwrap_err();
    assert!(matches!(err, StoreError::StoredDataInvalid(ref key) if key == "rdpman:connection"));
}

#[tokio::test]
async fn regroup_and_group_assignment_touch_only_matching_records() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());

    let cred = credentials.create("ops", "pw").await.unwrap();
    let web = connections.create("web", None, Some("Lab")).await.unwrap();
    let db = connections.create("db", None, Some("Lab")).await.unwrap();
    let other = connections.create("mail", None, Some("Prod")).await.unwrap();

    assert_eq!(
        connections
            .assign_group_credential("Lab", Some(&cred))
            .await
            .unwrap(),
        2
    );
    // Already assigned
    assert_eq!(
        connections
            .assign_group_credential("Lab", Some(&cred))
            .await
            .unwrap(),
        0
    );
    assert_eq!(connections.count_using_credential(&cred).await.unwrap(), 2);

    let moved = connections
        .regroup(
            &[web.clone(), db.clone()],
            &rdpman_core::DropTarget::Connection(other.clone()),
        )
        .await
        .unwrap();
    assert_eq!(moved, 2);
    assert_eq!(connections.groups().await.unwrap(), vec!["Prod".to_string()]);

    let moved = connections
        .regroup(&[web.clone()], &rdpman_core::DropTarget::Root)
        .await
        .unwrap();
    assert_eq!(moved, 1);
    let web = connections.get_by_id(&web).await.unwrap().unwrap();
    assert_eq!(web.group, None);
}

#[tokio::test]
async fn import_skips_existing_ids_and_validates_everything_first() {
    let backends = Backends::empty();
    let connections = ConnectionStore::new(backends.ctx.clone());
    let existing = connections.create("srv01", None, None).await.unwrap();

    let entries = rdpman_core::transfer::from_json(&format!(
        r#"[{{"id": "{existing}", "hostname": "srv01"}}, {{"hostname": "srv02", "group": "Lab"}}]"#
    ))
    .unwrap();
    let summary = connections.import(&entries).await.unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 1);

    let writes = backends.blobs.write_count();
    let oversized = rdpman_core::transfer::from_json(&format!(
        r#"[{{"hostname": "ok"}}, {{"hostname": "{}"}}]"#,
        "h".repeat(300)
    ))
    .unwrap();
    assert!(connections.import(&oversized).await.is_err());
    assert_eq!(backends.blobs.write_count(), writes);

    let all = connections.get_all().await.unwrap();
    connections.wait_for_migrations().await;
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn file_backends_persist_across_instances() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    let secrets = dir.path().join("secrets.json");
    let open = || {
        StoreContext::new(
            Arc::new(JsonFileBlobStore::new(&state)),
            Arc::new(FileSecretVault::new(&secrets)),
        )
    };

    let ctx = open();
    let cred = CredentialStore::new(ctx.clone())
        .create("alice", "pw")
        .await
        .unwrap();
    let conn = ConnectionStore::new(ctx)
        .create("srv01", Some(&cred), Some("Lab"))
        .await
        .unwrap();

    let ctx = open();
    let connection = ConnectionStore::new(ctx.clone())
        .get_by_id(&conn)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(connection.credential_id.as_deref(), Some(cred.as_str()));

    let credential = CredentialStore::new(ctx)
        .get_with_password_by_id(&cred)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credential.expose_password(), "pw");

    let state_text = std::fs::read_to_string(&state).unwrap();
    assert!(state_text.contains("srv01"));
    assert!(!state_text.contains("\"pw\""));
}
