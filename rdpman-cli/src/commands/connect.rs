//! Connect command.

use rdpman_core::commands::{CommandArgs, CommandId};
use rdpman_core::prompt::keys;
use rdpman_core::rdp::RdpLauncher;

use super::CliContext;
use crate::error::CliError;
use crate::terminal::Presets;
use crate::util::find_connection;

/// Connect command handler
///
/// With `dry_run` the launch plan is printed with the password masked and
/// nothing is executed.
pub fn cmd_connect(
    ctx: &CliContext,
    name: &str,
    credential: Option<&str>,
    dry_run: bool,
) -> Result<(), CliError> {
    let presets = Presets::new().with_opt(keys::CREDENTIAL, credential);
    let launcher = RdpLauncher::new().with_dry_run(dry_run);
    let registry = ctx.registry_with_launcher(presets, launcher)?;

    let connections = ctx.connections(&registry)?;
    let id = find_connection(&connections, name)?.id.clone();

    ctx.execute(&registry, CommandId::Connect, CommandArgs::target(id))
}
