//! Schema migration for persisted records
//!
//! Older versions of the data layout referenced credentials by username,
//! briefly stored a username in `credentialId`, and used snake_case timestamp
//! keys. The transforms here normalize records in place and report how many
//! were touched; the stores decide whether to persist.
//!
//! Both transforms are idempotent and infallible. A record that cannot be
//! fully resolved keeps its best-effort correction.

use crate::models::{Connection, CredentialMeta};

/// Outcome of one migration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Records inspected
    pub examined: usize,
    /// Records changed by the pass
    pub migrated: usize,
    /// Whether the corrected collection was written back
    pub persisted: bool,
    /// Error from the surrounding read or write, if any
    pub failed: Option<String>,
}

impl MigrationReport {
    /// Returns true if any record changed
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.migrated > 0
    }

    /// Report for a pass that could not run
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            failed: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Heuristic for stray `credentialId` values: generated ids are UUIDs and
/// contain hyphens, legacy usernames usually don't.
fn looks_like_generated_id(value: &str) -> bool {
    value.contains('-')
}

fn find_by_username<'a>(credentials: &'a [CredentialMeta], username: &str) -> Option<&'a CredentialMeta> {
    credentials.iter().find(|c| c.username == username)
}

/// Resolves a `credentialId` that does not match any known credential.
/// Returns true if the record changed.
fn repair_dangling_reference(connection: &mut Connection, credentials: &[CredentialMeta]) -> bool {
    let Some(current) = connection.credential_id.as_deref() else {
        return false;
    };
    if credentials.iter().any(|c| c.id == current) {
        return false;
    }

    if let Some(credential) = find_by_username(credentials, current) {
        tracing::debug!(
            connection_id = %connection.id,
            credential_id = %credential.id,
            "Resolved username stored in credentialId"
        );
        connection.credential_id = Some(credential.id.clone());
        return true;
    }

    if !looks_like_generated_id(current) {
        tracing::debug!(
            connection_id = %connection.id,
            "Cleared unresolvable credential reference"
        );
        connection.credential_id = None;
        return true;
    }

    false
}

fn migrate_connection(
    connection: &mut Connection,
    credentials: &[CredentialMeta],
    now: &str,
) -> bool {
    let mut changed = false;

    if let Some(username) = connection.legacy.credential_username.take() {
        changed = true;
        if let Some(credential) = find_by_username(credentials, &username) {
            connection.credential_id = Some(credential.id.clone());
        } else {
            tracing::debug!(
                connection_id = %connection.id,
                "No credential matches legacy credentialUsername"
            );
            // The untouched credentialId still gets checked so a second pass finds nothing to do
            changed |= repair_dangling_reference(connection, credentials);
        }
    } else {
        changed |= repair_dangling_reference(connection, credentials);
    }

    if let Some(created) = connection.legacy.created_at.take() {
        changed = true;
        if connection.created_at.is_none() {
            connection.created_at = Some(created);
        }
    }
    if let Some(modified) = connection.legacy.modified_at.take() {
        changed = true;
        if connection.modified_at.is_none() {
            connection.modified_at = Some(modified);
        }
    }

    if connection.created_at.is_none() {
        connection.created_at = Some(now.to_string());
        changed = true;
    }

    changed
}

/// Normalizes legacy connection records in place
///
/// `credentials` is the current credential metadata used to resolve
/// username-based references; `now` fills in missing creation timestamps.
pub fn migrate_connections(
    connections: &mut [Connection],
    credentials: &[CredentialMeta],
    now: &str,
) -> MigrationReport {
    let migrated = connections
        .iter_mut()
        .map(|c| migrate_connection(c, credentials, now))
        .filter(|changed| *changed)
        .count();

    MigrationReport {
        examined: connections.len(),
        migrated,
        ..MigrationReport::default()
    }
}

/// Normalizes legacy credential metadata in place
///
/// Credentials only ever lacked a camelCase creation timestamp.
pub fn migrate_credentials(credentials: &mut [CredentialMeta], now: &str) -> MigrationReport {
    let mut migrated = 0;
    for credential in credentials.iter_mut() {
        let mut changed = false;
        if let Some(created) = credential.legacy.created_at.take() {
            changed = true;
            if credential.created_at.is_none() {
                credential.created_at = Some(created);
            }
        }
        if credential.created_at.is_none() {
            credential.created_at = Some(now.to_string());
            changed = true;
        }
        if changed {
            migrated += 1;
        }
    }

    MigrationReport {
        examined: credentials.len(),
        migrated,
        ..MigrationReport::default()
    }
}
