//! Add connection command.

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::prompt::keys;

use super::{CliContext, credential_answer};
use crate::error::CliError;
use crate::terminal::Presets;

/// Parameters for the add command
pub struct AddParams<'a> {
    pub host: Option<&'a str>,
    pub group: Option<&'a str>,
    pub credential: Option<&'a str>,
}

/// Add connection command handler
///
/// Flags answer the matching prompts; anything missing is asked for.
pub fn cmd_add(ctx: &CliContext, params: AddParams<'_>) -> Result<(), CliError> {
    let presets = Presets::new()
        .with_opt(keys::HOSTNAME, params.host)
        .with_opt(keys::GROUP, params.group)
        .with_opt(keys::CREDENTIAL, params.credential.map(credential_answer));

    let registry = ctx.registry(presets)?;
    ctx.execute(&registry, CommandId::CreateConnection, CommandArgs::default())
}
