//! Credential store
//!
//! Metadata (`id`, `username`, timestamps) is kept in the blob store under
//! `<prefix>:credential`. Passwords go to the secret vault under
//! `<prefix>.credential.secret.<id>` and never touch the blob store.

use secrecy::SecretString;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::migration::migrate_credentials;
use crate::models::{
    Credential, CredentialMeta, LegacyCredentialFields, ResolvedCredential, new_record_id,
    now_timestamp,
};
use crate::storage::StoreContext;
use crate::validation::{is_credential_array, validate_password, validate_username};

/// CRUD over credentials
#[derive(Debug, Clone)]
pub struct CredentialStore {
    ctx: StoreContext,
}

impl CredentialStore {
    /// Creates a store over the given persistence context
    #[must_use]
    pub const fn new(ctx: StoreContext) -> Self {
        Self { ctx }
    }

    /// Persistence context this store writes to
    #[must_use]
    pub const fn context(&self) -> &StoreContext {
        &self.ctx
    }

    /// Reads and shape-checks the metadata collection without migrating it
    async fn read_metadata(&self) -> StoreResult<Vec<CredentialMeta>> {
        let key = self.ctx.keys().credentials();
        let Some(value) = self.ctx.blobs().get(&key).await? else {
            return Ok(Vec::new());
        };

        if !is_credential_array(&value) {
            tracing::warn!(key = %key, "Stored credential data failed validation");
            return Err(StoreError::InvalidCredentialData);
        }

        Ok(serde_json::from_value(value)?)
    }

    async fn write_metadata(&self, credentials: &[CredentialMeta]) -> StoreResult<()> {
        let value: Value = serde_json::to_value(credentials)?;
        self.ctx
            .blobs()
            .update(&self.ctx.keys().credentials(), value)
            .await
    }

    /// Returns credential metadata, migrating and persisting legacy records
    ///
    /// Does not touch the secret vault.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentialData` if the stored collection is malformed,
    /// or a storage error if reading or writing fails.
    pub async fn list_metadata(&self) -> StoreResult<Vec<CredentialMeta>> {
        let mut credentials = self.read_metadata().await?;

        let report = migrate_credentials(&mut credentials, &now_timestamp());
        if report.has_changes() {
            tracing::info!(
                migrated = report.migrated,
                "Migrated legacy credential records"
            );
            self.write_metadata(&credentials).await?;
        }

        Ok(credentials)
    }

    async fn password_for(&self, id: &str) -> StoreResult<Option<String>> {
        let key = self.ctx.keys().credential_secret(id);
        Ok(self.ctx.secrets().get(&key).await?)
    }

    /// Returns every credential with its password resolved from the vault
    ///
    /// A credential whose secret is missing gets an empty password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentialData` if the stored collection is malformed,
    /// or a storage/secret error if a backend fails.
    pub async fn get_all(&self) -> StoreResult<Vec<Credential>> {
        let metadata = self.list_metadata().await?;

        let mut credentials = Vec::with_capacity(metadata.len());
        for meta in metadata {
            let password = self.password_for(&meta.id).await?.unwrap_or_default();
            credentials.push(Credential {
                id: meta.id,
                username: meta.username,
                password: SecretString::from(password),
                created_at: meta.created_at.unwrap_or_default(),
                modified_at: meta.modified_at,
            });
        }

        Ok(credentials)
    }

    /// Returns the credential with the given id
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::get_all`].
    pub async fn get_by_id(&self, id: &str) -> StoreResult<Option<Credential>> {
        Ok(self.get_all().await?.into_iter().find(|c| c.id == id))
    }

    /// Returns id, username and password, or `None` if the credential is
    /// unknown or has no stored password
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is malformed or a backend fails.
    pub async fn get_with_password_by_id(
        &self,
        id: &str,
    ) -> StoreResult<Option<ResolvedCredential>> {
        let Some(meta) = self.list_metadata().await?.into_iter().find(|c| c.id == id) else {
            return Ok(None);
        };

        match self.password_for(id).await? {
            Some(password) if !password.is_empty() => Ok(Some(ResolvedCredential {
                id: meta.id,
                username: meta.username,
                password: SecretString::from(password),
            })),
            _ => Ok(None),
        }
    }

    /// Creates a credential and returns its id
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank or oversized input,
    /// `DuplicateCredential` if the username is taken, or a backend error.
    /// Nothing is written when validation or the duplicate check fails.
    pub async fn create(&self, username: &str, password: &str) -> StoreResult<String> {
        validate_username(username)?;
        validate_password(password)?;

        let mut credentials = self.list_metadata().await?;
        if credentials.iter().any(|c| c.username == username) {
            return Err(StoreError::DuplicateCredential(username.to_string()));
        }

        let id = new_record_id();
        credentials.push(CredentialMeta {
            id: id.clone(),
            username: username.to_string(),
            created_at: Some(now_timestamp()),
            modified_at: None,
            legacy: LegacyCredentialFields::default(),
        });
        self.write_metadata(&credentials).await?;

        let secret_key = self.ctx.keys().credential_secret(&id);
        if let Err(e) = self.ctx.secrets().store(&secret_key, password).await {
            tracing::error!(credential_id = %id, error = %e, "Failed to store password, rolling back");
            credentials.retain(|c| c.id != id);
            self.write_metadata(&credentials).await?;
            return Err(e.into());
        }

        tracing::info!(credential_id = %id, "Credential created");
        Ok(id)
    }

    /// Replaces username and password of an existing credential
    ///
    /// Keeps `createdAt`, sets `modifiedAt` to now.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `CredentialNotFound`, `DuplicateCredential`
    /// if another credential owns `username`, or a backend error. The
    /// metadata is restored when the secret cannot be stored.
    pub async fn update(&self, id: &str, username: &str, password: &str) -> StoreResult<()> {
        validate_username(username)?;
        validate_password(password)?;

        let mut credentials = self.list_metadata().await?;
        let Some(index) = credentials.iter().position(|c| c.id == id) else {
            return Err(StoreError::CredentialNotFound(id.to_string()));
        };
        if credentials
            .iter()
            .any(|c| c.id != id && c.username == username)
        {
            return Err(StoreError::DuplicateCredential(username.to_string()));
        }

        let original = credentials.clone();
        let record = &mut credentials[index];
        record.username = username.to_string();
        record.modified_at = Some(now_timestamp());
        self.write_metadata(&credentials).await?;

        let secret_key = self.ctx.keys().credential_secret(id);
        if let Err(e) = self.ctx.secrets().store(&secret_key, password).await {
            tracing::error!(credential_id = %id, error = %e, "Failed to store password, rolling back");
            self.write_metadata(&original).await?;
            return Err(e.into());
        }

        tracing::info!(credential_id = %id, "Credential updated");
        Ok(())
    }

    /// Deletes a credential and its secret. Returns false if it did not exist.
    ///
    /// Connections referencing it are not touched here; callers clear them
    /// through the connection store.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata is malformed or a backend fails. The
    /// metadata is restored when the secret cannot be deleted.
    pub async fn delete(&self, id: &str) -> StoreResult<bool> {
        let original = self.list_metadata().await?;
        let mut credentials = original.clone();
        credentials.retain(|c| c.id != id);
        if credentials.len() == original.len() {
            return Ok(false);
        }

        self.write_metadata(&credentials).await?;
        let secret_key = self.ctx.keys().credential_secret(id);
        if let Err(e) = self.ctx.secrets().delete(&secret_key).await {
            tracing::error!(credential_id = %id, error = %e, "Failed to delete password, rolling back");
            self.write_metadata(&original).await?;
            return Err(e.into());
        }

        tracing::info!(credential_id = %id, "Credential deleted");
        Ok(true)
    }
}
