//! Connection store
//!
//! Connections are kept as one JSON array under `<prefix>:connection`.
//! Reading the collection through [`ConnectionStore::get_all`] kicks off the
//! schema migration in the background and returns the snapshot as read;
//! migrated data becomes visible on a later read.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::Instrument;

use crate::drag_drop::{DropTarget, apply_drop};
use crate::error::{StoreError, StoreResult};
use crate::migration::{MigrationReport, migrate_connections};
use crate::models::{Connection, new_record_id, normalize_group, now_timestamp};
use crate::storage::StoreContext;
use crate::tracing::span_names;
use crate::transfer::ConnectionEntry;
use crate::validation::{is_connection_array, validate_group, validate_hostname};

use super::CredentialStore;

/// Called once a background migration pass has finished
pub type MigrationHook = Arc<dyn Fn(MigrationReport) + Send + Sync>;

/// Result of importing a connection list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Entries appended to the collection
    pub imported: usize,
    /// Entries skipped because their id already exists
    pub skipped: usize,
}

/// CRUD over connections
#[derive(Clone)]
pub struct ConnectionStore {
    ctx: StoreContext,
    migration_hook: Option<MigrationHook>,
    in_flight: Arc<watch::Sender<usize>>,
}

impl std::fmt::Debug for ConnectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStore")
            .field("ctx", &self.ctx)
            .field("migration_hook", &self.migration_hook.is_some())
            .field("in_flight", &*self.in_flight.borrow())
            .finish()
    }
}

impl ConnectionStore {
    /// Creates a store over the given persistence context
    #[must_use]
    pub fn new(ctx: StoreContext) -> Self {
        Self {
            ctx,
            migration_hook: None,
            in_flight: Arc::new(watch::channel(0).0),
        }
    }

    /// Installs a hook that receives the report of every background migration
    #[must_use]
    pub fn with_migration_hook(mut self, hook: MigrationHook) -> Self {
        self.migration_hook = Some(hook);
        self
    }

    /// Persistence context this store writes to
    #[must_use]
    pub const fn context(&self) -> &StoreContext {
        &self.ctx
    }

    /// Reads and shape-checks the collection without triggering migration
    async fn read_records(&self) -> StoreResult<Vec<Connection>> {
        let key = self.ctx.keys().connections();
        let Some(value) = self.ctx.blobs().get(&key).await? else {
            return Ok(Vec::new());
        };

        if !is_connection_array(&value) {
            tracing::warn!(key = %key, "Stored connection data failed validation");
            return Err(StoreError::InvalidConnectionData);
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Returns all connections as currently stored
    ///
    /// Spawns the migration routine as a detached task; the returned
    /// snapshot is the pre-migration data.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConnectionData` if the stored collection is malformed,
    /// or a storage error if reading fails.
    pub async fn get_all(&self) -> StoreResult<Vec<Connection>> {
        let connections = self.read_records().await?;
        if !connections.is_empty() {
            self.spawn_migration();
        }
        Ok(connections)
    }

    fn spawn_migration(&self) {
        let store = self.clone();
        self.in_flight.send_modify(|n| *n += 1);
        let span = tracing::debug_span!(span_names::MIGRATION_RUN);
        let task = async move {
            let report = match store.run_migration().await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!(error = %e, code = e.code(), "Connection migration failed");
                    MigrationReport::failure(e.to_string())
                }
            };
            if let Some(hook) = &store.migration_hook {
                hook(report);
            }
            store.in_flight.send_modify(|n| *n = n.saturating_sub(1));
        };
        tokio::spawn(task.instrument(span));
    }

    /// Waits until every migration spawned by this store (or its clones) has finished
    pub async fn wait_for_migrations(&self) {
        let mut rx = self.in_flight.subscribe();
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Runs one migration pass against the stored collection and persists
    /// the result if anything changed
    ///
    /// # Errors
    ///
    /// Returns an error if reading either collection or writing the result
    /// fails. The transform itself cannot fail.
    pub async fn run_migration(&self) -> StoreResult<MigrationReport> {
        let mut connections = self.read_records().await?;
        let credentials = CredentialStore::new(self.ctx.clone())
            .list_metadata()
            .await?;

        let mut report = migrate_connections(&mut connections, &credentials, &now_timestamp());
        if report.has_changes() {
            self.write_records(&connections).await?;
            report.persisted = true;
            tracing::info!(
                migrated = report.migrated,
                examined = report.examined,
                "Migrated legacy connection records"
            );
        }

        Ok(report)
    }

    async fn write_records(&self, connections: &[Connection]) -> StoreResult<()> {
        let value: Value = serde_json::to_value(connections)?;
        self.ctx
            .blobs()
            .update(&self.ctx.keys().connections(), value)
            .await
    }

    /// Returns the connection with the given id
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Connection>> {
        Ok(self.read_records().await?.into_iter().find(|c| c.id == id))
    }

    /// Number of connections referencing a credential
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn count_using_credential(&self, credential_id: &str) -> StoreResult<usize> {
        Ok(self
            .read_records()
            .await?
            .iter()
            .filter(|c| c.uses_credential(credential_id))
            .count())
    }

    /// Distinct non-empty group labels, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn groups(&self) -> StoreResult<Vec<String>> {
        let groups: BTreeSet<String> = self
            .read_records()
            .await?
            .iter()
            .filter_map(|c| c.group_name().map(ToString::to_string))
            .collect();
        Ok(groups.into_iter().collect())
    }

    /// Creates a connection and returns its id
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank or oversized hostname or an
    /// oversized group, `DuplicateConnection` if the same hostname and
    /// credential pair exists, or a backend error.
    pub async fn create(
        &self,
        hostname: &str,
        credential_id: Option<&str>,
        group: Option<&str>,
    ) -> StoreResult<String> {
        validate_hostname(hostname)?;
        validate_group(group)?;
        let credential_id = credential_id.filter(|c| !c.is_empty());

        let mut connections = self.read_records().await?;
        if connections
            .iter()
            .any(|c| c.hostname == hostname && c.credential_id.as_deref() == credential_id)
        {
            return Err(StoreError::DuplicateConnection {
                hostname: hostname.to_string(),
                credential_id: credential_id.map(ToString::to_string),
            });
        }

        let connection = Connection::new(hostname, credential_id.map(ToString::to_string), group);
        let id = connection.id.clone();
        connections.push(connection);
        self.update_all(&connections).await?;

        tracing::info!(connection_id = %id, "Connection created");
        Ok(id)
    }

    /// Edits one connection in place
    ///
    /// # Errors
    ///
    /// Returns a validation error, `ConnectionNotFound`, or a backend error.
    pub async fn update(
        &self,
        id: &str,
        hostname: &str,
        credential_id: Option<&str>,
        group: Option<&str>,
    ) -> StoreResult<()> {
        validate_hostname(hostname)?;
        validate_group(group)?;

        let mut connections = self.read_records().await?;
        let connection = connections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::ConnectionNotFound(id.to_string()))?;

        connection.hostname = hostname.to_string();
        connection.credential_id = credential_id
            .filter(|c| !c.is_empty())
            .map(ToString::to_string);
        connection.group = normalize_group(group);
        connection.touch();

        self.update_all(&connections).await?;
        tracing::info!(connection_id = %id, "Connection updated");
        Ok(())
    }

    /// Replaces the whole collection
    ///
    /// The written data is read back and validated again; host storage that
    /// hands back something else than what was written is reported as
    /// `StoredDataInvalid`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConnectionData` if `connections` fails the shape check,
    /// `StoredDataInvalid` if the read-back fails it, or a backend error.
    pub async fn update_all(&self, connections: &[Connection]) -> StoreResult<()> {
        let value: Value = serde_json::to_value(connections)?;
        if !is_connection_array(&value) {
            return Err(StoreError::InvalidConnectionData);
        }

        let key = self.ctx.keys().connections();
        self.ctx.blobs().update(&key, value).await?;

        match self.ctx.blobs().get(&key).await? {
            Some(stored) if is_connection_array(&stored) => Ok(()),
            Some(_) => {
                tracing::error!(key = %key, "Connection data invalid right after write");
                Err(StoreError::StoredDataInvalid(key))
            }
            None => {
                tracing::error!(key = %key, "Connection data missing right after write");
                Err(StoreError::StoredDataInvalid(key))
            }
        }
    }

    /// Points every connection referencing `old_credential_id` at
    /// `new_credential_id`. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the collection fails.
    pub async fn update_credential_reference(
        &self,
        old_credential_id: &str,
        new_credential_id: &str,
    ) -> StoreResult<usize> {
        self.rewrite_references(old_credential_id, Some(new_credential_id))
            .await
    }

    /// Removes the credential reference from every connection using
    /// `credential_id`. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the collection fails.
    pub async fn clear_credential_reference(&self, credential_id: &str) -> StoreResult<usize> {
        self.rewrite_references(credential_id, None).await
    }

    async fn rewrite_references(&self, from: &str, to: Option<&str>) -> StoreResult<usize> {
        let mut connections = self.read_records().await?;
        let mut affected = 0;
        for connection in connections.iter_mut().filter(|c| c.uses_credential(from)) {
            connection.credential_id = to.map(ToString::to_string);
            connection.touch();
            affected += 1;
        }

        if affected > 0 {
            self.update_all(&connections).await?;
            tracing::info!(affected, "Rewrote credential references");
        }
        Ok(affected)
    }

    /// Sets the credential of every connection in `group`. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the collection fails.
    pub async fn assign_group_credential(
        &self,
        group: &str,
        credential_id: Option<&str>,
    ) -> StoreResult<usize> {
        let mut connections = self.read_records().await?;
        let mut affected = 0;
        for connection in connections
            .iter_mut()
            .filter(|c| c.group_name() == Some(group))
        {
            if connection.credential_id.as_deref() != credential_id {
                connection.credential_id = credential_id.map(ToString::to_string);
                connection.touch();
                affected += 1;
            }
        }

        if affected > 0 {
            self.update_all(&connections).await?;
        }
        Ok(affected)
    }

    /// Moves connections to the group implied by a drop target. Returns how many moved.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an oversized group name, or an error
    /// if reading or writing the collection fails.
    pub async fn regroup(&self, dragged_ids: &[String], target: &DropTarget) -> StoreResult<usize> {
        if let DropTarget::Group(name) = target {
            validate_group(Some(name))?;
        }

        let mut connections = self.read_records().await?;
        let moved = apply_drop(&mut connections, dragged_ids, target, &now_timestamp());
        if moved > 0 {
            self.update_all(&connections).await?;
            tracing::info!(moved, "Connections regrouped");
        }
        Ok(moved)
    }

    /// Appends imported entries; entries whose id already exists are skipped
    ///
    /// No duplicate (hostname, credential) check is made on import.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any entry is out of bounds (nothing is
    /// written in that case), or a backend error.
    pub async fn import(&self, entries: &[ConnectionEntry]) -> StoreResult<ImportSummary> {
        for entry in entries {
            validate_hostname(&entry.hostname)?;
            validate_group(entry.group.as_deref())?;
        }

        let mut connections = self.read_records().await?;
        let mut summary = ImportSummary::default();
        for entry in entries {
            let id = entry
                .id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(new_record_id);
            if connections.iter().any(|c| c.id == id) {
                tracing::debug!(connection_id = %id, "Skipping imported entry with existing id");
                summary.skipped += 1;
                continue;
            }

            let mut connection = Connection::new(entry.hostname.clone(), None, entry.group.as_deref());
            connection.id = id;
            connections.push(connection);
            summary.imported += 1;
        }

        if summary.imported > 0 {
            self.update_all(&connections).await?;
        }
        tracing::info!(
            imported = summary.imported,
            skipped = summary.skipped,
            "Connections imported"
        );
        Ok(summary)
    }

    /// Deletes a connection. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing the collection fails.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let mut connections = self.read_records().await?;
        let before = connections.len();
        connections.retain(|c| c.id != id);
        if connections.len() == before {
            return Ok(false);
        }

        self.update_all(&connections).await?;
        tracing::info!(connection_id = %id, "Connection deleted");
        Ok(true)
    }
}
