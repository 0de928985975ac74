//! Configuration management for `rdpman`
//!
//! This module provides the `ConfigManager` for locating the configuration
//! directory and loading and saving `config.toml`.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager, SECRET_BACKEND_ENV};
pub use settings::{AppSettings, LoggingSettings, RdpDefaults, SecretBackendType, StorageSettings};
