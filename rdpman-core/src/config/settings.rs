//! Application settings stored in `config.toml`

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::storage::DEFAULT_KEY_PREFIX;

/// Color depths accepted by the native client
pub const VALID_BPP: [u8; 5] = [8, 15, 16, 24, 32];

/// Where passwords are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretBackendType {
    /// System keyring through `secret-tool`
    #[default]
    Keyring,
    /// `secrets.json` next to the configuration
    File,
}

impl SecretBackendType {
    /// Name as written in the configuration file
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::File => "file",
        }
    }
}

impl fmt::Display for SecretBackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretBackendType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" | "libsecret" => Ok(Self::Keyring),
            "file" => Ok(Self::File),
            other => Err(ConfigError::Validation {
                field: "storage.secret_backend".to_string(),
                reason: format!("unknown backend '{other}' (expected 'keyring' or 'file')"),
            }),
        }
    }
}

/// `[storage]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Password backend
    pub secret_backend: SecretBackendType,
    /// Prefix for blob and secret keys
    pub key_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            secret_backend: SecretBackendType::default(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// `[rdp]` section: defaults for every launched session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdpDefaults {
    /// Start sessions full screen
    pub fullscreen: bool,
    /// Desktop width in pixels
    pub width: u32,
    /// Desktop height in pixels
    pub height: u32,
    /// Color depth
    pub bpp: u8,
    /// Server authentication level
    pub authentication_level: u8,
    /// Let the client ask for credentials
    pub prompt_for_credentials: bool,
    /// Share the clipboard
    pub redirect_clipboard: bool,
    /// Share local printers
    pub redirect_printers: bool,
    /// Drives to redirect
    pub drives: String,
}

impl Default for RdpDefaults {
    fn default() -> Self {
        Self {
            fullscreen: false,
            width: 1920,
            height: 1080,
            bpp: 32,
            authentication_level: 2,
            prompt_for_credentials: false,
            redirect_clipboard: true,
            redirect_printers: false,
            drives: String::new(),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default log level when no verbosity flag is given
    pub level: String,
    /// Write logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Storage settings
    pub storage: StorageSettings,
    /// Session defaults
    pub rdp: RdpDefaults,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Checks values serde cannot
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first bad setting.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, reason: String| ConfigError::Validation {
            field: field.to_string(),
            reason,
        };

        if self.storage.key_prefix.trim().is_empty() {
            return Err(invalid("storage.key_prefix", "must not be empty".into()));
        }
        if self.rdp.width == 0 || self.rdp.height == 0 {
            return Err(invalid(
                "rdp.width",
                format!("resolution {}x{} is not valid", self.rdp.width, self.rdp.height),
            ));
        }
        if !VALID_BPP.contains(&self.rdp.bpp) {
            return Err(invalid(
                "rdp.bpp",
                format!("{} is not one of 8, 15, 16, 24, 32", self.rdp.bpp),
            ));
        }
        if self.rdp.authentication_level > 2 {
            return Err(invalid(
                "rdp.authentication_level",
                format!("{} is not 0, 1 or 2", self.rdp.authentication_level),
            ));
        }
        Ok(())
    }
}
