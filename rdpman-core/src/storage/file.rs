//! File-backed storage
//!
//! Both backends keep a single JSON object on disk and rewrite it whole on
//! every change (temp file + rename). Every call reads the file again; no
//! state is cached between calls. Read-modify-write cycles are serialized per
//! store so writes to different keys never drop each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::error::{SecretError, SecretResult, StoreError, StoreResult};

use super::{BlobStore, SecretVault};

async fn read_object(path: &Path) -> std::io::Result<Map<String, Value>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(Map::new()),
        Ok(content) => match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} does not contain a JSON object", path.display()),
            )),
            Err(e) => Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(e) => Err(e),
    }
}

/// Writes `content` to a fresh temp file, owner-only from creation when `private`
async fn write_temp(tmp_path: &Path, content: &[u8], private: bool) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    // A leftover file would keep its old mode
    match tokio::fs::remove_file(tmp_path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    if private {
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    let mut file = options.open(tmp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await
}

async fn write_object(path: &Path, map: &Map<String, Value>, private: bool) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = serde_json::to_string_pretty(map)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let tmp_path = path.with_extension("json.tmp");
    write_temp(&tmp_path, content.as_bytes(), private).await?;
    tokio::fs::rename(&tmp_path, path).await
}

/// Blob store persisted as one JSON object keyed by blob key
#[derive(Debug, Clone)]
pub struct JsonFileBlobStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileBlobStore {
    /// Creates a store backed by the file at `path` (created on first write)
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::default(),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BlobStore for JsonFileBlobStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let map = read_object(&self.path)
            .await
            .map_err(|e| StoreError::Storage(format!("{}: {e}", self.path.display())))?;
        Ok(map.get(key).cloned())
    }

    async fn update(&self, key: &str, value: Value) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = read_object(&self.path)
            .await
            .map_err(|e| StoreError::Storage(format!("{}: {e}", self.path.display())))?;
        map.insert(key.to_string(), value);
        write_object(&self.path, &map, false)
            .await
            .map_err(|e| StoreError::Storage(format!("{}: {e}", self.path.display())))?;
        tracing::debug!(key, path = %self.path.display(), "Blob persisted");
        Ok(())
    }
}

/// Secret vault persisted as a plain JSON file with owner-only permissions
///
/// Intended for headless machines and tests where no keyring daemon runs.
/// Passwords are stored unencrypted.
#[derive(Debug, Clone)]
pub struct FileSecretVault {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileSecretVault {
    /// Creates a vault backed by the file at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::default(),
        }
    }
}

#[async_trait]
impl SecretVault for FileSecretVault {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> SecretResult<Option<String>> {
        let map = read_object(&self.path)
            .await
            .map_err(|e| SecretError::RetrieveFailed(e.to_string()))?;
        Ok(map.get(key).and_then(Value::as_str).map(ToString::to_string))
    }

    async fn store(&self, key: &str, value: &str) -> SecretResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = read_object(&self.path)
            .await
            .map_err(|e| SecretError::StoreFailed(e.to_string()))?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        write_object(&self.path, &map, true)
            .await
            .map_err(|e| SecretError::StoreFailed(e.to_string()))
    }

    async fn delete(&self, key: &str) -> SecretResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = read_object(&self.path)
            .await
            .map_err(|e| SecretError::DeleteFailed(e.to_string()))?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        write_object(&self.path, &map, true)
            .await
            .map_err(|e| SecretError::DeleteFailed(e.to_string()))
    }
}
