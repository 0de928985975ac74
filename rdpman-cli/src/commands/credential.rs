//! Credential management commands.

use std::fmt::Write as _;

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::prompt::keys;

use super::CliContext;
use crate::cli::{CredentialCommands, OutputFormat};
use crate::error::CliError;
use crate::format::{column_width, escape_csv_field};
use crate::terminal::Presets;
use crate::util::{find_credential, read_stdin_line};

/// Credential command handler
pub fn cmd_credential(ctx: &CliContext, subcmd: &CredentialCommands) -> Result<(), CliError> {
    match subcmd {
        CredentialCommands::List { format } => cmd_credential_list(ctx, *format),
        CredentialCommands::Add {
            username,
            password_stdin,
        } => {
            let presets = Presets::new()
                .with_opt(keys::USERNAME, username.as_deref())
                .with_opt(keys::PASSWORD, password_from_stdin(*password_stdin)?);
            let registry = ctx.registry(presets)?;
            ctx.execute(&registry, CommandId::CreateCredential, CommandArgs::default())
        }
        CredentialCommands::Edit {
            credential,
            username,
            password_stdin,
        } => {
            let presets = Presets::new()
                .with_opt(keys::USERNAME, username.as_deref())
                .with_opt(keys::PASSWORD, password_from_stdin(*password_stdin)?);
            let registry = ctx.registry(presets)?;
            let credentials = ctx.credentials(&registry)?;
            let id = find_credential(&credentials, credential)?.id.clone();
            ctx.execute(&registry, CommandId::UpdateCredential, CommandArgs::target(id))
        }
        CredentialCommands::Delete { credential, yes } => {
            let presets = Presets::new().with_opt(keys::CONFIRM, yes.then_some("yes"));
            let registry = ctx.registry(presets)?;
            let credentials = ctx.credentials(&registry)?;
            let id = find_credential(&credentials, credential)?.id.clone();
            ctx.execute(&registry, CommandId::DeleteCredential, CommandArgs::target(id))
        }
    }
}

fn password_from_stdin(enabled: bool) -> Result<Option<String>, CliError> {
    if enabled {
        read_stdin_line().map(Some)
    } else {
        Ok(None)
    }
}

fn cmd_credential_list(ctx: &CliContext, format: OutputFormat) -> Result<(), CliError> {
    let registry = ctx.registry(Presets::new())?;
    let credentials = ctx.credentials(&registry)?;
    let connections = ctx.connections(&registry)?;

    let rows: Vec<CredentialOutput> = credentials
        .iter()
        .map(|c| CredentialOutput {
            id: c.id.clone(),
            username: c.username.clone(),
            connections: connections
                .iter()
                .filter(|conn| conn.uses_credential(&c.id))
                .count(),
        })
        .collect();

    match format {
        OutputFormat::Table => println!("{}", format_table(&rows)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&rows)
                .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))?
        ),
        OutputFormat::Csv => {
            let mut output = String::from("id,username,connections\n");
            for row in &rows {
                let _ = writeln!(
                    output,
                    "{},{},{}",
                    escape_csv_field(&row.id),
                    escape_csv_field(&row.username),
                    row.connections
                );
            }
            println!("{}", output.trim_end());
        }
    }
    Ok(())
}

/// Credential output for CLI; never carries a password
#[derive(Debug, Clone, serde::Serialize)]
struct CredentialOutput {
    id: String,
    username: String,
    connections: usize,
}

fn format_table(rows: &[CredentialOutput]) -> String {
    if rows.is_empty() {
        return "No credentials found.".to_string();
    }

    let user_width = column_width("USERNAME", rows.iter().map(|r| r.username.as_str()));
    let mut output = String::new();
    let _ = writeln!(output, "{:<user_width$}  {:>11}  ID", "USERNAME", "CONNECTIONS");
    let _ = writeln!(output, "{:-<user_width$}  {:->11}  --", "", "");
    for row in rows {
        let _ = writeln!(
            output,
            "{:<user_width$}  {:>11}  {}",
            row.username, row.connections, row.id
        );
    }
    output.trim_end().to_string()
}
