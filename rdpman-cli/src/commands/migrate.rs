//! Migrate command.

use super::{CliContext, command_set};
use crate::error::CliError;
use crate::terminal::Presets;

/// Migrate command handler
///
/// Runs one migration pass in the foreground. A second run reports no
/// changes.
pub fn cmd_migrate(ctx: &CliContext) -> Result<(), CliError> {
    let registry = ctx.registry(Presets::new())?;
    let report = ctx.block_on(command_set(&registry)?.connections().run_migration())?;

    if !ctx.quiet() {
        println!(
            "Examined {} connection(s), migrated {}",
            report.examined, report.migrated
        );
        if !report.has_changes() {
            println!("Catalog is up to date.");
        }
    }
    Ok(())
}
