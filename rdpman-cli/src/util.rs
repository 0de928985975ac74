//! Shared utility functions used across command modules.

use std::io::BufRead;
use std::path::Path;

use rdpman_core::config::ConfigManager;
use rdpman_core::models::{Connection, CredentialMeta};

use crate::error::CliError;

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Find a connection by ID or hostname
pub fn find_connection<'a>(
    connections: &'a [Connection],
    host_or_id: &str,
) -> Result<&'a Connection, CliError> {
    if let Some(conn) = connections.iter().find(|c| c.id == host_or_id) {
        return Ok(conn);
    }

    if let Some(conn) = connections.iter().find(|c| c.hostname == host_or_id) {
        return Ok(conn);
    }

    if let Some(conn) = connections
        .iter()
        .find(|c| c.hostname.eq_ignore_ascii_case(host_or_id))
    {
        return Ok(conn);
    }

    // Unique hostname prefix
    let needle = host_or_id.to_lowercase();
    let matches: Vec<_> = connections
        .iter()
        .filter(|c| c.hostname.to_lowercase().starts_with(&needle))
        .collect();

    match matches.as_slice() {
        [] => Err(CliError::ConnectionNotFound(host_or_id.to_string())),
        [conn] => Ok(conn),
        _ => {
            let hosts: Vec<_> = matches.iter().map(|c| c.hostname.as_str()).collect();
            Err(CliError::Usage(format!(
                "Ambiguous connection '{}'. Matches: {}",
                host_or_id,
                hosts.join(", ")
            )))
        }
    }
}

/// Find a credential by ID or username (usernames are unique)
pub fn find_credential<'a>(
    credentials: &'a [CredentialMeta],
    username_or_id: &str,
) -> Result<&'a CredentialMeta, CliError> {
    credentials
        .iter()
        .find(|c| c.id == username_or_id)
        .or_else(|| {
            credentials
                .iter()
                .find(|c| c.username.eq_ignore_ascii_case(username_or_id))
        })
        .ok_or_else(|| CliError::CredentialNotFound(username_or_id.to_string()))
}

/// Reads one line from stdin without its line ending
pub fn read_stdin_line() -> Result<String, CliError> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
