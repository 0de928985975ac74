//! Core data models for `rdpman`
//!
//! Record layouts match the persisted JSON (camelCase keys). Timestamps are
//! kept as the strings found on disk so legacy values survive untouched.

mod connection;
mod credential;

pub use connection::{Connection, LegacyConnectionFields};
pub use credential::{Credential, CredentialMeta, LegacyCredentialFields, ResolvedCredential};

use chrono::{SecondsFormat, Utc};

/// Returns the current time as an ISO-8601 UTC timestamp with millisecond precision
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generates a new opaque record id
#[must_use]
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Normalizes a free-text group label: blank means "no group"
#[must_use]
pub fn normalize_group(group: Option<&str>) -> Option<String> {
    group
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(ToString::to_string)
}
