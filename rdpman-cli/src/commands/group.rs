//! Regrouping commands.

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::drag_drop::DropTarget;
use rdpman_core::prompt::keys;

use super::{CliContext, credential_answer};
use crate::cli::MoveArgs;
use crate::error::CliError;
use crate::terminal::Presets;
use crate::util::find_connection;

/// Move command handler
///
/// Behaves like dropping the connections on a group, on the tree root or on
/// another connection.
pub fn cmd_move(ctx: &CliContext, args: &MoveArgs) -> Result<(), CliError> {
    let registry = ctx.registry(Presets::new())?;
    let connections = ctx.connections(&registry)?;

    let dragged = args
        .connections
        .iter()
        .map(|name| find_connection(&connections, name).map(|c| c.id.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let target = match (&args.group, args.root, &args.onto) {
        (Some(group), false, None) => DropTarget::Group(group.clone()),
        (None, true, None) => DropTarget::Root,
        (None, false, Some(onto)) => {
            DropTarget::Connection(find_connection(&connections, onto)?.id.clone())
        }
        _ => {
            return Err(CliError::Usage(
                "Specify exactly one of --group, --root or --onto".to_string(),
            ));
        }
    };

    ctx.execute(
        &registry,
        CommandId::MoveConnections,
        CommandArgs::drop(dragged, target),
    )
}

/// Assign-group command handler
pub fn cmd_assign_group(ctx: &CliContext, group: &str, credential: &str) -> Result<(), CliError> {
    let presets = Presets::new()
        .with(keys::GROUP_PICK, group)
        .with(keys::CREDENTIAL, credential_answer(credential));
    let registry = ctx.registry(presets)?;
    ctx.execute(
        &registry,
        CommandId::AssignGroupCredentials,
        CommandArgs::default(),
    )
}
