//! Host storage seams
//!
//! The stores never talk to disk directly. They go through two host-owned
//! key-value abstractions:
//! - [`BlobStore`] holds arbitrary JSON documents (the record collections)
//! - [`SecretVault`] holds sensitive strings (passwords) keyed by credential
//!
//! A [`StoreContext`] bundles both together with the key naming scheme and is
//! the handle every store operation receives.

mod file;
mod keyring;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{SecretResult, StoreResult};

pub use file::{FileSecretVault, JsonFileBlobStore};
pub use keyring::{KeyringVault, is_secret_tool_available};
pub use memory::{MemoryBlobStore, MemorySecretVault};

/// Default key prefix for all persisted state
pub const DEFAULT_KEY_PREFIX: &str = "rdpman";

/// Key-value store for JSON documents
///
/// Each call is individually durable; there is no transaction spanning a
/// `get` and a later `update`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Reads the document stored under `key`, or `None` if nothing is stored
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;

    /// Replaces the document stored under `key`
    async fn update(&self, key: &str, value: Value) -> StoreResult<()>;
}

/// Key-value store for secrets
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Backend name for diagnostics
    fn name(&self) -> &'static str;

    /// Reads a secret, `None` if absent
    async fn get(&self, key: &str) -> SecretResult<Option<String>>;

    /// Stores or overwrites a secret
    async fn store(&self, key: &str, value: &str) -> SecretResult<()>;

    /// Deletes a secret; deleting a missing key is not an error
    async fn delete(&self, key: &str) -> SecretResult<()>;
}

/// Naming scheme for blob and secret keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    prefix: String,
}

impl StorageKeys {
    /// Creates a key scheme under the given prefix
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Blob key for the connection collection (`<prefix>:connection`)
    #[must_use]
    pub fn connections(&self) -> String {
        format!("{}:connection", self.prefix)
    }

    /// Blob key for the credential metadata collection (`<prefix>:credential`)
    #[must_use]
    pub fn credentials(&self) -> String {
        format!("{}:credential", self.prefix)
    }

    /// Vault key for a credential's password (`<prefix>.credential.secret.<id>`)
    #[must_use]
    pub fn credential_secret(&self, credential_id: &str) -> String {
        format!("{}.credential.secret.{credential_id}", self.prefix)
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

/// Persistence context handed to every store operation
#[derive(Clone)]
pub struct StoreContext {
    blobs: Arc<dyn BlobStore>,
    secrets: Arc<dyn SecretVault>,
    keys: StorageKeys,
}

impl StoreContext {
    /// Creates a context with the default key prefix
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, secrets: Arc<dyn SecretVault>) -> Self {
        Self {
            blobs,
            secrets,
            keys: StorageKeys::default(),
        }
    }

    /// Overrides the key naming scheme
    #[must_use]
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Creates a context backed entirely by memory
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryBlobStore::new()),
            Arc::new(MemorySecretVault::new()),
        )
    }

    /// Blob store
    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }

    /// Secret vault
    #[must_use]
    pub fn secrets(&self) -> &dyn SecretVault {
        self.secrets.as_ref()
    }

    /// Key naming scheme
    #[must_use]
    pub const fn keys(&self) -> &StorageKeys {
        &self.keys
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("secrets", &self.secrets.name())
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
