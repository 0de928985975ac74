//! In-memory storage backends
//!
//! Used by tests and by hosts that don't need persistence. Both backends
//! count writes so callers can assert that a rejected operation wrote nothing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{SecretResult, StoreResult};

use super::{BlobStore, SecretVault};

/// Blob store kept in a `HashMap`
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    data: RwLock<HashMap<String, Value>>,
    writes: AtomicUsize,
}

impl MemoryBlobStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one document
    #[must_use]
    pub fn with_value(key: impl Into<String>, value: Value) -> Self {
        let mut data = HashMap::new();
        data.insert(key.into(), value);
        Self {
            data: RwLock::new(data),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `update` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Reads a document without going through the trait
    pub async fn snapshot(&self, key: &str) -> Option<Value> {
        self.data.read().await.get(key).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.data.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

/// Secret vault kept in a `HashMap`
#[derive(Debug, Default)]
pub struct MemorySecretVault {
    data: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemorySecretVault {
    /// Creates an empty vault
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `store` and `delete` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of secrets currently held
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Returns true if the vault holds no secrets
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

#[async_trait]
impl SecretVault for MemorySecretVault {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> SecretResult<Option<String>> {
        Ok(self.data.read().await.get(key).cloned())
    }

    async fn store(&self, key: &str, value: &str) -> SecretResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.data
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> SecretResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.data.write().await.remove(key);
        Ok(())
    }
}
