//! Locating, loading and saving the configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult};
use crate::storage::{
    FileSecretVault, JsonFileBlobStore, KeyringVault, SecretVault, StorageKeys, StoreContext,
};

use super::settings::{AppSettings, SecretBackendType};

/// Overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "RDPMAN_CONFIG_DIR";

/// Overrides `storage.secret_backend`
pub const SECRET_BACKEND_ENV: &str = "RDPMAN_SECRET_BACKEND";

const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";
const SECRETS_FILE: &str = "secrets.json";

/// Owns the configuration directory and the files in it
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default directory
    ///
    /// Uses `RDPMAN_CONFIG_DIR` when set, else `<config dir>/rdpman`.
    ///
    /// # Errors
    ///
    /// Returns `NoConfigDir` if the platform has no configuration directory.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join("rdpman")))
    }

    /// Creates a manager for an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of `config.toml`
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Path of the blob store file
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.config_dir.join(STATE_FILE)
    }

    /// Path of the file-backed secret vault
    #[must_use]
    pub fn secrets_path(&self) -> PathBuf {
        self.config_dir.join(SECRETS_FILE)
    }

    /// Loads settings; a missing file gives defaults
    ///
    /// `RDPMAN_SECRET_BACKEND` overrides the stored backend.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed TOML, `Validation` for out-of-range
    /// values or an unknown backend override.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let path = self.config_path();
        let mut settings = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<AppSettings>(&content)
                .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No configuration file, using defaults");
                AppSettings::default()
            }
            Err(e) => return Err(ConfigError::Parse(format!("{}: {e}", path.display()))),
        };

        if let Some(backend) = std::env::var(SECRET_BACKEND_ENV).ok().filter(|b| !b.is_empty()) {
            settings.storage.secret_backend = backend.parse()?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings to `config.toml`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `Serialize` or `Write` errors.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        settings.validate()?;
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::create_dir_all(&self.config_dir)
            .map_err(|e| ConfigError::Write(format!("{}: {e}", self.config_dir.display())))?;
        std::fs::write(self.config_path(), content)
            .map_err(|e| ConfigError::Write(format!("{}: {e}", self.config_path().display())))
    }

    /// Builds the persistence context described by `settings`
    #[must_use]
    pub fn store_context(&self, settings: &AppSettings) -> StoreContext {
        let secrets: Arc<dyn SecretVault> = match settings.storage.secret_backend {
            SecretBackendType::Keyring => Arc::new(KeyringVault::new()),
            SecretBackendType::File => Arc::new(FileSecretVault::new(self.secrets_path())),
        };
        StoreContext::new(Arc::new(JsonFileBlobStore::new(self.state_path())), secrets)
            .with_keys(StorageKeys::new(settings.storage.key_prefix.clone()))
    }
}
