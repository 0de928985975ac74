//! CLI error types and exit codes.

use rdpman_core::error::{ConfigError, RegistryError, StoreError, TransferError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, validation, storage or a failed command
    pub const GENERAL_ERROR: i32 = 1;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection not found
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// Credential not found
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    /// Store error outside a command
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Transfer error
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Command registration or lookup failed
    #[error("Command error: {0}")]
    Registry(#[from] RegistryError),

    /// Invalid combination of arguments
    #[error("{0}")]
    Usage(String),

    /// A command failed; the host already showed the message
    #[error("Failed to {0}")]
    CommandFailed(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl CliError {
    /// Returns the exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error), including a cancelled prompt
    /// - 1: Every error
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        exit_codes::GENERAL_ERROR
    }

    /// Returns true if the message was already printed by the command host
    #[must_use]
    pub const fn is_reported(&self) -> bool {
        matches!(self, Self::CommandFailed(_))
    }
}
