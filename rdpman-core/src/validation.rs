//! Record shape checks and input bounds
//!
//! Shape validators inspect raw JSON read from the blob store. They never
//! fail loudly: a mismatch is logged with `tracing::warn!` and reported by
//! returning `false`.
//!
//! Input validators run before any store write and return a
//! [`ValidationError`] describing the first offending field.

use serde_json::Value;

use crate::error::ValidationError;

/// Maximum hostname length in characters
pub const MAX_HOSTNAME_LENGTH: usize = 255;
/// Maximum group label length in characters
pub const MAX_GROUP_LENGTH: usize = 255;
/// Maximum username length in characters
pub const MAX_USERNAME_LENGTH: usize = 255;
/// Maximum password length in characters
pub const MAX_PASSWORD_LENGTH: usize = 1000;

const CONNECTION_REQUIRED: &[&str] = &["id", "hostname"];
const CONNECTION_OPTIONAL: &[&str] = &[
    "group",
    "credentialId",
    "createdAt",
    "modifiedAt",
    "credentialUsername",
    "created_at",
    "modified_at",
];

const CREDENTIAL_REQUIRED: &[&str] = &["id", "username"];
const CREDENTIAL_OPTIONAL: &[&str] = &["createdAt", "modifiedAt", "created_at"];

/// Checks that every required key holds a string and every optional key,
/// when present and not null, holds a string.
fn check_shape(value: &Value, kind: &str, required: &[&str], optional: &[&str]) -> bool {
    let Some(object) = value.as_object() else {
        tracing::warn!(kind, "Record is not an object");
        return false;
    };

    for field in required {
        match object.get(*field) {
            Some(Value::String(_)) => {}
            Some(_) => {
                tracing::warn!(kind, field, "Required field has the wrong type");
                return false;
            }
            None => {
                tracing::warn!(kind, field, "Required field is missing");
                return false;
            }
        }
    }

    for field in optional {
        match object.get(*field) {
            None | Some(Value::Null | Value::String(_)) => {}
            Some(_) => {
                tracing::warn!(kind, field, "Optional field has the wrong type");
                return false;
            }
        }
    }

    true
}

fn check_array(value: &Value, kind: &str, check: fn(&Value) -> bool) -> bool {
    let Some(items) = value.as_array() else {
        tracing::warn!(kind, "Stored collection is not an array");
        return false;
    };
    items.iter().all(check)
}

/// Returns true if `value` has the shape of a connection record
#[must_use]
pub fn is_connection(value: &Value) -> bool {
    check_shape(value, "connection", CONNECTION_REQUIRED, CONNECTION_OPTIONAL)
}

/// Returns true if `value` is an array of connection records
#[must_use]
pub fn is_connection_array(value: &Value) -> bool {
    check_array(value, "connection", is_connection)
}

/// Returns true if `value` has the shape of a credential metadata record
#[must_use]
pub fn is_credential(value: &Value) -> bool {
    check_shape(value, "credential", CREDENTIAL_REQUIRED, CREDENTIAL_OPTIONAL)
}

/// Returns true if `value` is an array of credential metadata records
#[must_use]
pub fn is_credential_array(value: &Value) -> bool {
    check_array(value, "credential", is_credential)
}

fn require_bounded(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong { field, max, actual });
    }
    Ok(())
}

/// Validates a connection hostname
///
/// # Errors
///
/// Returns an error if the hostname is blank or longer than 255 characters.
pub fn validate_hostname(hostname: &str) -> Result<(), ValidationError> {
    require_bounded("hostname", hostname, MAX_HOSTNAME_LENGTH)
}

/// Validates an optional group label; blank labels are accepted as "no group"
///
/// # Errors
///
/// Returns an error if the label is longer than 255 characters.
pub fn validate_group(group: Option<&str>) -> Result<(), ValidationError> {
    let Some(group) = group else {
        return Ok(());
    };
    let actual = group.chars().count();
    if actual > MAX_GROUP_LENGTH {
        return Err(ValidationError::TooLong {
            field: "group",
            max: MAX_GROUP_LENGTH,
            actual,
        });
    }
    Ok(())
}

/// Validates a credential username
///
/// # Errors
///
/// Returns an error if the username is blank or longer than 255 characters.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    require_bounded("username", username, MAX_USERNAME_LENGTH)
}

/// Validates a credential password
///
/// # Errors
///
/// Returns an error if the password is empty or longer than 1000 characters.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::Empty { field: "password" });
    }
    let actual = password.chars().count();
    if actual > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password",
            max: MAX_PASSWORD_LENGTH,
            actual,
        });
    }
    Ok(())
}
