//! Delete connection command.

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::prompt::keys;

use super::CliContext;
use crate::error::CliError;
use crate::terminal::Presets;
use crate::util::find_connection;

/// Delete connection command handler
pub fn cmd_delete(ctx: &CliContext, name: &str, yes: bool) -> Result<(), CliError> {
    let presets = Presets::new().with_opt(keys::CONFIRM, yes.then_some("yes"));
    let registry = ctx.registry(presets)?;

    let connections = ctx.connections(&registry)?;
    let id = find_connection(&connections, name)?.id.clone();

    ctx.execute(&registry, CommandId::DeleteConnection, CommandArgs::target(id))
}
