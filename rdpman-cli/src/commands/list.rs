//! List and tree commands.

use std::fmt::Write as _;

use rdpman_core::models::{Connection, CredentialMeta};
use rdpman_core::tree::{NO_CREDENTIAL_LABEL, TreeItem, build_connection_tree};

use super::CliContext;
use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::format::{column_width, escape_csv_field};
use crate::terminal::Presets;

/// List connections command handler
pub fn cmd_list(
    ctx: &CliContext,
    format: OutputFormat,
    group: Option<&str>,
) -> Result<(), CliError> {
    let registry = ctx.registry(Presets::new())?;
    let connections = ctx.connections(&registry)?;
    let credentials = ctx.credentials(&registry)?;

    let filtered: Vec<&Connection> = connections
        .iter()
        .filter(|c| {
            group.is_none_or(|filter| {
                c.group_name()
                    .is_some_and(|g| g.eq_ignore_ascii_case(filter.trim()))
            })
        })
        .collect();

    let rows: Vec<ConnectionOutput> = filtered
        .iter()
        .map(|c| ConnectionOutput::new(c, &credentials))
        .collect();

    match format {
        OutputFormat::Table => println!("{}", format_table(&rows)),
        OutputFormat::Json => println!("{}", format_json(&rows)?),
        OutputFormat::Csv => println!("{}", format_csv(&rows)),
    }

    Ok(())
}

/// Tree command handler
pub fn cmd_tree(ctx: &CliContext) -> Result<(), CliError> {
    let registry = ctx.registry(Presets::new())?;
    let connections = ctx.connections(&registry)?;
    let credentials = ctx.credentials(&registry)?;

    println!("{}", format_tree(&build_connection_tree(&connections, &credentials)));
    Ok(())
}

/// Simplified connection output for CLI
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConnectionOutput {
    pub id: String,
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl ConnectionOutput {
    fn new(connection: &Connection, credentials: &[CredentialMeta]) -> Self {
        let credential = connection
            .credential_id
            .as_deref()
            .and_then(|id| credentials.iter().find(|c| c.id == id))
            .map(|c| c.username.clone());
        Self {
            id: connection.id.clone(),
            hostname: connection.hostname.clone(),
            group: connection.group_name().map(ToString::to_string),
            credential,
        }
    }
}

/// Format connections as a table string
#[must_use]
pub fn format_table(rows: &[ConnectionOutput]) -> String {
    if rows.is_empty() {
        return "No connections found.".to_string();
    }

    let host_width = column_width("HOSTNAME", rows.iter().map(|r| r.hostname.as_str()));
    let group_width = column_width("GROUP", rows.iter().map(|r| r.group.as_deref().unwrap_or("-")));
    let cred_width = column_width(
        "CREDENTIAL",
        rows.iter().map(|r| r.credential.as_deref().unwrap_or("-")),
    );

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{:<host_width$}  {:<group_width$}  {:<cred_width$}  ID",
        "HOSTNAME", "GROUP", "CREDENTIAL"
    );
    let _ = writeln!(
        output,
        "{:-<host_width$}  {:-<group_width$}  {:-<cred_width$}  --",
        "", "", ""
    );

    for row in rows {
        let _ = writeln!(
            output,
            "{:<host_width$}  {:<group_width$}  {:<cred_width$}  {}",
            row.hostname,
            row.group.as_deref().unwrap_or("-"),
            row.credential.as_deref().unwrap_or("-"),
            row.id
        );
    }

    output.trim_end().to_string()
}

/// Format connections as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(rows: &[ConnectionOutput]) -> Result<String, CliError> {
    serde_json::to_string_pretty(rows)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format connections as CSV string
#[must_use]
pub fn format_csv(rows: &[ConnectionOutput]) -> String {
    let mut output = String::from("id,hostname,group,credential\n");
    for row in rows {
        let _ = writeln!(
            output,
            "{},{},{},{}",
            escape_csv_field(&row.id),
            escape_csv_field(&row.hostname),
            escape_csv_field(row.group.as_deref().unwrap_or("")),
            escape_csv_field(row.credential.as_deref().unwrap_or("")),
        );
    }
    output.trim_end().to_string()
}

/// Render tree items with two-space indentation per level
#[must_use]
pub fn format_tree(items: &[TreeItem]) -> String {
    fn render(items: &[TreeItem], depth: usize, output: &mut String) {
        let indent = "  ".repeat(depth);
        for item in items {
            match item {
                TreeItem::Group { name, children } => {
                    let _ = writeln!(output, "{indent}{name}/");
                    render(children, depth + 1, output);
                }
                TreeItem::Connection {
                    hostname,
                    credential_label,
                    ..
                } if credential_label != NO_CREDENTIAL_LABEL => {
                    let _ = writeln!(output, "{indent}{hostname} [{credential_label}]");
                }
                other => {
                    let _ = writeln!(output, "{indent}{}", other.label());
                }
            }
        }
    }

    let mut output = String::new();
    render(items, 0, &mut output);
    output.trim_end().to_string()
}
