//! Credential records
//!
//! Metadata ([`CredentialMeta`]) lives in the blob store; the password lives
//! only in the secret vault and is joined back in by the credential store.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Keys written by older schema versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCredentialFields {
    /// snake_case creation timestamp
    #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Credential metadata as persisted in the blob store (never holds a password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialMeta {
    /// Opaque unique id, immutable
    pub id: String,
    /// Login name, unique across credentials
    pub username: String,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Legacy keys awaiting migration
    #[serde(flatten)]
    pub legacy: LegacyCredentialFields,
}

/// A credential joined with its password
#[derive(Debug, Clone)]
pub struct Credential {
    /// Opaque unique id
    pub id: String,
    /// Login name
    pub username: String,
    /// Password from the secret vault; empty if the vault has none
    pub password: SecretString,
    /// Creation timestamp
    pub created_at: String,
    /// Last modification timestamp
    pub modified_at: Option<String>,
}

impl Credential {
    /// Exposes the password for handing to a launcher
    #[must_use]
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Returns true if the vault held a non-empty password
    #[must_use]
    pub fn has_password(&self) -> bool {
        !self.password.expose_secret().is_empty()
    }
}

/// Minimal credential used for launching: id, username and a stored password
#[derive(Debug, Clone)]
pub struct ResolvedCredential {
    /// Credential id
    pub id: String,
    /// Login name
    pub username: String,
    /// Password from the secret vault
    pub password: SecretString,
}

impl ResolvedCredential {
    /// Exposes the password
    #[must_use]
    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}
