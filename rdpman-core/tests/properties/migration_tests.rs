//! Property-based tests for the legacy record migration

use proptest::prelude::*;
use rdpman_core::models::{CredentialMeta, LegacyCredentialFields};
use rdpman_core::{Connection, migrate_connections};

const NOW: &str = "2025-01-01T00:00:00.000Z";

fn credentials() -> Vec<CredentialMeta> {
    ["alice", "bob"]
        .iter()
        .enumerate()
        .map(|(index, username)| CredentialMeta {
            id: format!("cred-{index}"),
            username: (*username).to_string(),
            created_at: Some(NOW.to_string()),
            modified_at: None,
            legacy: LegacyCredentialFields::default(),
        })
        .collect()
}

/// A credential reference as found in old data
fn arb_reference() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("cred-0".to_string())),
        Just(Some("alice".to_string())),
        Just(Some("ghost".to_string())),
        Just(Some("dead-beef".to_string())),
    ]
}

fn arb_legacy_connection() -> impl Strategy<Value = Connection> {
    (
        arb_reference(),
        prop::option::of(prop_oneof![Just("alice"), Just("bob"), Just("nobody")]),
        prop::option::of(Just("2024-01-01")),
        prop::option::of(Just("2024-01-02")),
        prop::option::of(Just("2024-03-03")),
    )
        .prop_map(|(reference, username, created, legacy_created, legacy_modified)| {
            let mut connection = Connection::new("host", reference, None);
            connection.created_at = created.map(ToString::to_string);
            connection.legacy.credential_username = username.map(ToString::to_string);
            connection.legacy.created_at = legacy_created.map(ToString::to_string);
            connection.legacy.modified_at = legacy_modified.map(ToString::to_string);
            connection
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Running the migration twice changes nothing the second time
    #[test]
    fn prop_migration_is_idempotent(
        mut connections in prop::collection::vec(arb_legacy_connection(), 0..10),
    ) {
        let credentials = credentials();
        migrate_connections(&mut connections, &credentials, NOW);
        let once = connections.clone();

        let report = migrate_connections(&mut connections, &credentials, NOW);
        prop_assert_eq!(report.migrated, 0);
        prop_assert_eq!(connections, once);
    }

    /// Migrated records carry no legacy keys and always have a creation time
    #[test]
    fn prop_migrated_records_are_normalized(
        mut connections in prop::collection::vec(arb_legacy_connection(), 0..10),
    ) {
        let report = migrate_connections(&mut connections, &credentials(), NOW);
        prop_assert_eq!(report.examined, connections.len());
        for connection in &connections {
            prop_assert!(connection.legacy.is_empty());
            prop_assert!(connection.created_at.is_some());
            let value = serde_json::to_value(connection).unwrap();
            prop_assert!(value.get("credentialUsername").is_none());
            prop_assert!(value.get("created_at").is_none());
            prop_assert!(value.get("modified_at").is_none());
        }
    }

    /// An existing camelCase timestamp wins over the snake_case one
    #[test]
    fn prop_camel_case_timestamp_wins(mut connection in arb_legacy_connection()) {
        let before = connection.created_at.clone();
        let legacy = connection.legacy.created_at.clone();
        migrate_connections(std::slice::from_mut(&mut connection), &credentials(), NOW);

        let expected = before.or(legacy).unwrap_or_else(|| NOW.to_string());
        prop_assert_eq!(connection.created_at, Some(expected));
    }
}
