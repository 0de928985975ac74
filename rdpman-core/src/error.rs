//! Error types for `rdpman`
//!
//! Every error kind carries a machine-readable code (see the `code()` methods)
//! and a human-readable message through `Display`. Command wrappers show only
//! the message to the user; codes go to the log.

use std::path::PathBuf;

use thiserror::Error;

/// Input rejected before anything was persisted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value is missing or blank
    #[error("{field} is required")]
    Empty {
        /// Name of the rejected field
        field: &'static str,
    },

    /// A value exceeds its length bound
    #[error("{field} exceeds maximum length of {max} characters (got {actual})")]
    TooLong {
        /// Name of the rejected field
        field: &'static str,
        /// Maximum allowed length in characters
        max: usize,
        /// Actual length in characters
        actual: usize,
    },
}

impl ValidationError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "validation_empty",
            Self::TooLong { .. } => "validation_too_long",
        }
    }

    /// Name of the field that failed validation
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } => field,
        }
    }
}

/// Configuration loading and saving errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse the configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A setting has an invalid value
    #[error("Invalid setting '{field}': {reason}")]
    Validation {
        /// Setting name
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write configuration
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// No configuration directory could be determined
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

impl ConfigError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "config_parse",
            Self::Validation { .. } => "config_validation",
            Self::NotFound(_) => "config_not_found",
            Self::Write(_) => "config_write",
            Self::Serialize(_) => "config_serialize",
            Self::NoConfigDir => "config_no_dir",
        }
    }
}

/// Secret vault errors
#[derive(Debug, Error)]
pub enum SecretError {
    /// Failed to store a secret
    #[error("Failed to store secret: {0}")]
    StoreFailed(String),

    /// Failed to retrieve a secret
    #[error("Failed to retrieve secret: {0}")]
    RetrieveFailed(String),

    /// Failed to delete a secret
    #[error("Failed to delete secret: {0}")]
    DeleteFailed(String),

    /// The configured backend cannot be used on this system
    #[error("Secret backend not available: {0}")]
    BackendUnavailable(String),

    /// libsecret (`secret-tool`) invocation error
    #[error("libsecret error: {0}")]
    LibSecret(String),
}

impl SecretError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::StoreFailed(_) => "secret_store_failed",
            Self::RetrieveFailed(_) => "secret_retrieve_failed",
            Self::DeleteFailed(_) => "secret_delete_failed",
            Self::BackendUnavailable(_) => "secret_backend_unavailable",
            Self::LibSecret(_) => "secret_libsecret",
        }
    }
}

/// Connection and credential store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted connection data does not have the expected shape
    #[error("Stored connection data is invalid")]
    InvalidConnectionData,

    /// Persisted credential data does not have the expected shape
    #[error("Stored credential data is invalid")]
    InvalidCredentialData,

    /// Data read back right after a write failed validation
    #[error("Stored data failed validation after write: {0}")]
    StoredDataInvalid(String),

    /// No credential with the given id
    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    /// No connection with the given id
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// Username already taken by another credential
    #[error("A credential with username '{0}' already exists")]
    DuplicateCredential(String),

    /// Same hostname and credential already saved
    #[error("A connection to '{hostname}' with the same credential already exists")]
    DuplicateConnection {
        /// Hostname of the rejected connection
        hostname: String,
        /// Credential reference of the rejected connection
        credential_id: Option<String>,
    },

    /// Blob store backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Secret vault failure
    #[error(transparent)]
    Secret(#[from] SecretError),

    /// Record could not be converted to or from JSON
    #[error("Failed to serialize records: {0}")]
    Serialize(String),
}

impl StoreError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::InvalidConnectionData => "invalid_connection_data",
            Self::InvalidCredentialData => "invalid_credential_data",
            Self::StoredDataInvalid(_) => "stored_data_invalid",
            Self::CredentialNotFound(_) => "credential_not_found",
            Self::ConnectionNotFound(_) => "connection_not_found",
            Self::DuplicateCredential(_) => "duplicate_credential",
            Self::DuplicateConnection { .. } => "duplicate_connection",
            Self::Storage(_) => "storage",
            Self::Secret(e) => e.code(),
            Self::Serialize(_) => "serialize",
        }
    }

    /// Returns true for not-found errors
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CredentialNotFound(_) | Self::ConnectionNotFound(_)
        )
    }

    /// Returns true for uniqueness violations
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(
            self,
            Self::DuplicateCredential(_) | Self::DuplicateConnection { .. }
        )
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

/// Remote-desktop launch errors
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The native client only exists on Windows
    #[error("Launching remote desktop sessions is not supported on {0}")]
    UnsupportedPlatform(String),

    /// An external program failed
    #[error("Command '{program}' failed: {reason}")]
    CommandFailed {
        /// Program name
        program: String,
        /// Exit status or spawn error
        reason: String,
    },

    /// Writing the temporary profile failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LaunchError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedPlatform(_) => "unsupported_platform",
            Self::CommandFailed { .. } => "launch_command_failed",
            Self::Io(_) => "launch_io",
        }
    }
}

/// Import/export file errors
#[derive(Debug, Error)]
pub enum TransferError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON
    #[error("Failed to parse file: {0}")]
    Parse(String),

    /// The file is JSON but not a connection list
    #[error("Invalid connection list: {0}")]
    InvalidFormat(String),
}

impl TransferError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "transfer_io",
            Self::Parse(_) => "transfer_parse",
            Self::InvalidFormat(_) => "transfer_invalid_format",
        }
    }
}

/// Catch-all for failures while running a user command
#[derive(Debug, Error)]
pub enum CommandError {
    /// Store operation failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Launching the remote client failed
    #[error(transparent)]
    Launch(#[from] LaunchError),

    /// Import or export failed
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Configuration could not be used
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A prompt failed (not cancelled)
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// Referenced item is gone or the request makes no sense
    #[error("{0}")]
    Failed(String),
}

impl CommandError {
    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Store(e) => e.code(),
            Self::Launch(e) => e.code(),
            Self::Transfer(e) => e.code(),
            Self::Config(e) => e.code(),
            Self::Prompt(_) => "prompt_failed",
            Self::Failed(_) => "command_failed",
        }
    }
}

/// Command registry misuse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `initialize` was called twice
    #[error("Commands are already registered")]
    AlreadyInitialized,

    /// A command ran before `initialize`
    #[error("Commands have not been registered yet")]
    NotInitialized,

    /// No command with this identifier
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum RdpManError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Secret storage error
    #[error("Secret storage error: {0}")]
    Secret(#[from] SecretError),

    /// Launch error
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Import/export error
    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    /// Command error
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// Command registry error
    #[error("Command registry error: {0}")]
    Registry(#[from] RegistryError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for secret vault operations
pub type SecretResult<T> = Result<T, SecretError>;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for launch operations
pub type LaunchResult<T> = Result<T, LaunchError>;

/// Result type for command bodies
pub type CommandResult<T> = Result<T, CommandError>;
