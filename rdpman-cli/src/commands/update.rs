//! Edit connection command.

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::prompt::keys;

use super::{CliContext, credential_answer};
use crate::error::CliError;
use crate::terminal::Presets;
use crate::util::find_connection;

/// Parameters for the edit command
pub struct UpdateParams<'a> {
    pub connection: &'a str,
    pub host: Option<&'a str>,
    pub group: Option<&'a str>,
    pub credential: Option<&'a str>,
}

/// Edit connection command handler
///
/// Fields without a flag keep their current value unless the terminal
/// prompt changes them.
pub fn cmd_update(ctx: &CliContext, params: UpdateParams<'_>) -> Result<(), CliError> {
    let presets = Presets::new()
        .with_opt(keys::HOSTNAME, params.host)
        .with_opt(keys::GROUP, params.group)
        .with_opt(keys::CREDENTIAL, params.credential.map(credential_answer));
    let registry = ctx.registry(presets)?;

    let connections = ctx.connections(&registry)?;
    let id = find_connection(&connections, params.connection)?.id.clone();

    ctx.execute(&registry, CommandId::UpdateConnection, CommandArgs::target(id))
}
