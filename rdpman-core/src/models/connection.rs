//! Connection record

use serde::{Deserialize, Serialize};

use super::{new_record_id, normalize_group, now_timestamp};

/// Keys written by older schema versions
///
/// Only the migration routine reads these; they are dropped once a record
/// has been migrated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyConnectionFields {
    /// Credential referenced by username instead of id
    #[serde(
        rename = "credentialUsername",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub credential_username: Option<String>,
    /// snake_case creation timestamp
    #[serde(rename = "created_at", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// snake_case modification timestamp
    #[serde(rename = "modified_at", default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl LegacyConnectionFields {
    /// Returns true if no legacy key is present
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.credential_username.is_none() && self.created_at.is_none() && self.modified_at.is_none()
    }
}

/// A saved remote-desktop target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Opaque unique id, immutable
    pub id: String,
    /// Remote host name or address
    pub hostname: String,
    /// Display group; `None` means ungrouped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Weak reference to a credential id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    /// Creation timestamp. Legacy records may lack one until migrated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last modification timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// Legacy keys awaiting migration
    #[serde(flatten)]
    pub legacy: LegacyConnectionFields,
}

impl Connection {
    /// Creates a new connection with a fresh id and creation timestamp
    #[must_use]
    pub fn new(
        hostname: impl Into<String>,
        credential_id: Option<String>,
        group: Option<&str>,
    ) -> Self {
        Self {
            id: new_record_id(),
            hostname: hostname.into(),
            group: normalize_group(group),
            credential_id,
            created_at: Some(now_timestamp()),
            modified_at: None,
            legacy: LegacyConnectionFields::default(),
        }
    }

    /// Marks the record as modified now
    pub fn touch(&mut self) {
        self.modified_at = Some(now_timestamp());
    }

    /// Group label, or `None` when ungrouped or blank
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    /// Returns true if the connection references the given credential
    #[must_use]
    pub fn uses_credential(&self, credential_id: &str) -> bool {
        self.credential_id.as_deref() == Some(credential_id)
    }
}
