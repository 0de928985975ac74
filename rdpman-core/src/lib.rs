//! `rdpman` Core Library
//!
//! This crate provides the core functionality for the `rdpman` remote-desktop
//! connection manager: the connection and credential catalogs, the schema
//! migration for older data, the command layer hosts dispatch into, and the
//! native client launcher.
//!
//! # Crate Structure
//!
//! - [`models`] - Connection and credential records
//! - [`validation`] - Shape checks for persisted data and input bounds
//! - [`storage`] - Host storage seams (blob store, secret vault)
//! - [`store`] - Connection and credential CRUD
//! - [`migration`] - Normalization of legacy records
//! - [`tree`] / [`drag_drop`] - Tree-view projection and regrouping
//! - [`transfer`] - Connection list import/export
//! - [`rdp`] - `.rdp` profiles and the native client launcher
//! - [`prompt`] / [`commands`] - Host prompts and user-facing commands
//! - [`config`] - Application settings and persistence

// Enable missing_docs warning for public API documentation
#![warn(missing_docs)]

pub mod commands;
pub mod config;
pub mod drag_drop;
pub mod error;
pub mod migration;
pub mod models;
pub mod prompt;
pub mod rdp;
pub mod storage;
pub mod store;
pub mod tracing;
pub mod transfer;
pub mod tree;
pub mod validation;

// =============================================================================
// Convenience re-exports
//
// These flat re-exports exist for property tests and integration tests. The
// CLI imports via modular paths (e.g. `rdpman_core::models::Connection`).
// =============================================================================

pub use commands::{CommandArgs, CommandId, CommandRegistry, CommandStatus, Commands, ViewHost};
pub use config::{AppSettings, ConfigManager, RdpDefaults, SecretBackendType};
pub use drag_drop::{DropTarget, apply_drop};
pub use error::{
    CommandError, ConfigError, LaunchError, RdpManError, RegistryError, SecretError, StoreError,
    TransferError, ValidationError,
};
pub use migration::{MigrationReport, migrate_connections, migrate_credentials};
pub use models::{Connection, Credential, CredentialMeta, ResolvedCredential};
pub use prompt::{ConfirmPrompt, FilePrompt, PickItem, PickPrompt, Prompter, TextPrompt};
pub use rdp::{CommandRunner, LaunchOutcome, PlannedCommand, RdpLauncher, RdpSettings, ScreenMode};
pub use storage::{BlobStore, MemoryBlobStore, MemorySecretVault, SecretVault, StoreContext};
pub use store::{ConnectionStore, CredentialStore, ImportSummary, MigrationHook};
pub use tree::{TreeItem, build_connection_tree, build_credential_tree};
