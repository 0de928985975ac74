//! Export and import commands.

use std::path::Path;

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::prompt::keys;

use super::CliContext;
use crate::error::CliError;
use crate::terminal::Presets;

/// Export command handler
pub fn cmd_export(ctx: &CliContext, output: &Path) -> Result<(), CliError> {
    let presets = Presets::new().with(keys::EXPORT_FILE, output.display().to_string());
    let registry = ctx.registry(presets)?;
    ctx.execute(&registry, CommandId::ExportConnections, CommandArgs::default())
}

/// Import command handler
pub fn cmd_import(ctx: &CliContext, file: &Path) -> Result<(), CliError> {
    if !file.exists() {
        return Err(CliError::Usage(format!("File not found: {}", file.display())));
    }
    let presets = Presets::new().with(keys::IMPORT_FILE, file.display().to_string());
    let registry = ctx.registry(presets)?;
    ctx.execute(&registry, CommandId::ImportConnections, CommandArgs::default())
}
