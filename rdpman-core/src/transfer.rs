//! Connection list import/export format
//!
//! The file is a plain JSON array of `{id, hostname, group}` objects. It carries
//! no credential references and no timestamps, so a list can be shared without
//! leaking anything tied to the local vault.

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransferError;
use crate::models::Connection;

/// File extension offered by save/open dialogs
pub const TRANSFER_FILE_EXTENSION: &str = "json";

/// One exported connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEntry {
    /// Connection id; a fresh one is generated on import when missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Host name
    pub hostname: String,
    /// Group label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl From<&Connection> for ConnectionEntry {
    fn from(connection: &Connection) -> Self {
        Self {
            id: Some(connection.id.clone()),
            hostname: connection.hostname.clone(),
            group: connection.group_name().map(ToString::to_string),
        }
    }
}

/// Builds export entries from stored connections
#[must_use]
pub fn to_entries(connections: &[Connection]) -> Vec<ConnectionEntry> {
    connections.iter().map(ConnectionEntry::from).collect()
}

/// Serializes entries as pretty-printed JSON
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(entries: &[ConnectionEntry]) -> Result<String, TransferError> {
    serde_json::to_string_pretty(entries).map_err(|e| TransferError::Parse(e.to_string()))
}

fn check_shape(value: &Value) -> Result<(), TransferError> {
    let Some(items) = value.as_array() else {
        return Err(TransferError::InvalidFormat(
            "expected a JSON array".to_string(),
        ));
    };

    for (index, item) in items.iter().enumerate() {
        let Some(object) = item.as_object() else {
            return Err(TransferError::InvalidFormat(format!(
                "entry {index} is not an object"
            )));
        };
        if !object.get("hostname").is_some_and(Value::is_string) {
            return Err(TransferError::InvalidFormat(format!(
                "entry {index} has no string 'hostname'"
            )));
        }
    }
    Ok(())
}

/// Parses a connection list
///
/// # Errors
///
/// Returns `Parse` for invalid JSON and `InvalidFormat` if the document is
/// not an array of objects with a string `hostname`.
pub fn from_json(json: &str) -> Result<Vec<ConnectionEntry>, TransferError> {
    let value: Value = serde_json::from_str(json).map_err(|e| TransferError::Parse(e.to_string()))?;
    check_shape(&value)?;
    serde_json::from_value(value).map_err(|e| TransferError::InvalidFormat(e.to_string()))
}

/// Writes entries to a file
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_file(path: &Path, entries: &[ConnectionEntry]) -> Result<(), TransferError> {
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, entries).map_err(|e| TransferError::Parse(e.to_string()))
}

/// Reads and validates entries from a file
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation.
pub fn read_file(path: &Path) -> Result<Vec<ConnectionEntry>, TransferError> {
    let file = fs::File::open(path)?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| TransferError::Parse(e.to_string()))?;
    check_shape(&value)?;
    serde_json::from_value(value).map_err(|e| TransferError::InvalidFormat(e.to_string()))
}
