//! Keyring vault via `secret-tool` (libsecret Secret Service API)
//!
//! Stores passwords in GNOME Keyring / KDE Wallet under the `application`
//! attribute `rdpman`.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{SecretError, SecretResult};

use super::SecretVault;

/// Application identifier used as the `application` attribute in keyring entries
const APP_ID: &str = "rdpman";

/// Checks whether the `secret-tool` binary is available on the system
pub async fn is_secret_tool_available() -> bool {
    Command::new("secret-tool")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Secret vault backed by the system keyring
#[derive(Debug, Clone)]
pub struct KeyringVault {
    label_prefix: String,
}

impl KeyringVault {
    /// Creates a keyring vault
    #[must_use]
    pub fn new() -> Self {
        Self {
            label_prefix: "rdpman".to_string(),
        }
    }
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SecretVault for KeyringVault {
    fn name(&self) -> &'static str {
        "keyring"
    }

    async fn get(&self, key: &str) -> SecretResult<Option<String>> {
        let output = Command::new("secret-tool")
            .args(["lookup", "application", APP_ID, "key", key])
            .output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to run secret-tool: {e}")))?;

        if !output.status.success() {
            return Ok(None);
        }

        // secret-tool appends no newline, but trim in case a wrapper does
        let value = String::from_utf8_lossy(&output.stdout)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    async fn store(&self, key: &str, value: &str) -> SecretResult<()> {
        use tokio::io::AsyncWriteExt;

        if !is_secret_tool_available().await {
            return Err(SecretError::BackendUnavailable(
                "secret-tool not found. Install libsecret-tools or set \
                 secret_backend = \"file\""
                    .into(),
            ));
        }

        let label = format!("{} {key}", self.label_prefix);
        let mut child = Command::new("secret-tool")
            .args(["store", "--label", label.as_str(), "application", APP_ID, "key", key])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SecretError::LibSecret(format!("Failed to spawn secret-tool: {e}")))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(value.as_bytes())
                .await
                .map_err(|e| SecretError::LibSecret(format!("Failed to write secret: {e}")))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to wait for secret-tool: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::StoreFailed(format!(
                "secret-tool store failed: {stderr}"
            )));
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> SecretResult<()> {
        let output = Command::new("secret-tool")
            .args(["clear", "application", APP_ID, "key", key])
            .output()
            .await
            .map_err(|e| SecretError::LibSecret(format!("Failed to run secret-tool: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SecretError::DeleteFailed(format!(
                "secret-tool clear failed: {stderr}"
            )));
        }

        Ok(())
    }
}
