//! Command handler modules for the CLI.

mod add;
mod completions;
mod connect;
mod credential;
mod delete;
mod export_import;
mod group;
mod list;
mod migrate;
mod update;

use std::sync::Arc;

use rdpman_core::commands::{
    CommandArgs, CommandId, CommandRegistry, CommandStatus, Commands as CommandSet,
};
use rdpman_core::config::{AppSettings, ConfigManager};
use rdpman_core::error::RegistryError;
use rdpman_core::models::{Connection, CredentialMeta};
use rdpman_core::prompt::NO_CREDENTIAL_ITEM;
use rdpman_core::rdp::RdpLauncher;
use rdpman_core::tracing::{
    TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing,
};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::terminal::{Presets, TerminalHost, TerminalPrompter};
use crate::util::create_config_manager;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(cli: &Cli) -> Result<(), CliError> {
    if let Commands::Completions { shell } = &cli.command {
        return completions::cmd_completions(*shell);
    }

    let ctx = CliContext::new(cli)?;
    match &cli.command {
        Commands::List { format, group } => list::cmd_list(&ctx, *format, group.as_deref()),
        Commands::Tree => list::cmd_tree(&ctx),
        Commands::Add {
            host,
            group,
            credential,
        } => add::cmd_add(
            &ctx,
            add::AddParams {
                host: host.as_deref(),
                group: group.as_deref(),
                credential: credential.as_deref(),
            },
        ),
        Commands::Edit {
            connection,
            host,
            group,
            credential,
        } => update::cmd_update(
            &ctx,
            update::UpdateParams {
                connection,
                host: host.as_deref(),
                group: group.as_deref(),
                credential: credential.as_deref(),
            },
        ),
        Commands::Delete { connection, yes } => delete::cmd_delete(&ctx, connection, *yes),
        Commands::Connect {
            connection,
            credential,
            dry_run,
        } => connect::cmd_connect(&ctx, connection, credential.as_deref(), *dry_run),
        Commands::Import { file } => export_import::cmd_import(&ctx, file),
        Commands::Export { file } => export_import::cmd_export(&ctx, file),
        Commands::Move(args) => group::cmd_move(&ctx, args),
        Commands::AssignGroup { group, credential } => {
            group::cmd_assign_group(&ctx, group, credential)
        }
        Commands::Credential(subcmd) => credential::cmd_credential(&ctx, subcmd),
        Commands::Migrate => migrate::cmd_migrate(&ctx),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Everything a command handler needs: settings, a runtime and the terminal
pub struct CliContext {
    runtime: tokio::runtime::Runtime,
    config: ConfigManager,
    settings: AppSettings,
    quiet: bool,
    no_input: bool,
}

impl CliContext {
    /// Loads settings and starts logging
    fn new(cli: &Cli) -> Result<Self, CliError> {
        let config = create_config_manager(cli.config.as_deref())?;
        let settings = config
            .load_settings()
            .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))?;

        let base = settings.logging.level.parse().unwrap_or_default();
        let level = TracingLevel::from_verbosity(base, cli.verbose, cli.quiet);
        let mut tracing_config = TracingConfig::new().with_level(level);
        if let Some(file) = &settings.logging.file {
            tracing_config = tracing_config.with_output(TracingOutput::File(file.clone()));
        }
        match init_tracing(&tracing_config) {
            Ok(()) | Err(TracingError::AlreadyInitialized) => {}
            Err(e) => eprintln!("Warning: logging disabled: {e}"),
        }

        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| CliError::Config(format!("Runtime error: {e}")))?;

        Ok(Self {
            runtime,
            config,
            settings,
            quiet: cli.quiet,
            no_input: cli.no_input,
        })
    }

    /// Registers the commands with a prompter answering from `presets`
    pub fn registry(&self, presets: Presets) -> Result<CommandRegistry, CliError> {
        self.registry_with_launcher(presets, RdpLauncher::new())
    }

    /// Same as [`Self::registry`] with a custom session launcher
    pub fn registry_with_launcher(
        &self,
        presets: Presets,
        launcher: RdpLauncher,
    ) -> Result<CommandRegistry, CliError> {
        let store_context = self.config.store_context(&self.settings);
        tracing::debug!(
            state = %self.config.state_path().display(),
            secrets = store_context.secrets().name(),
            "Opened catalog"
        );

        let commands = CommandSet::new(
            store_context,
            Arc::new(TerminalPrompter::new(presets, self.no_input)),
            Arc::new(TerminalHost::new(self.quiet)),
        )
        .with_launcher(launcher)
        .with_rdp_defaults(self.settings.rdp.clone());

        let mut registry = CommandRegistry::new();
        registry.initialize(commands)?;
        Ok(registry)
    }

    /// Returns true if informational output is suppressed
    pub const fn quiet(&self) -> bool {
        self.quiet
    }

    /// Runs `fut` to completion on the CLI runtime
    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Executes a registered command and waits for background migrations
    pub fn execute(
        &self,
        registry: &CommandRegistry,
        id: CommandId,
        args: CommandArgs,
    ) -> Result<(), CliError> {
        let status = self.block_on(registry.execute(&id.id(), args));
        self.finish(registry)?;

        match status? {
            CommandStatus::Completed => Ok(()),
            CommandStatus::Cancelled => {
                if !self.quiet {
                    eprintln!("Cancelled");
                }
                Ok(())
            }
            CommandStatus::Failed => Err(CliError::CommandFailed(id.operation())),
        }
    }

    /// Waits for migrations started by reads on the registry's stores
    pub fn finish(&self, registry: &CommandRegistry) -> Result<(), CliError> {
        let commands = command_set(registry)?;
        self.block_on(commands.connections().wait_for_migrations());
        Ok(())
    }

    /// Loads connections through the registry's store
    ///
    /// Waits for the migration the read starts, so an early return never
    /// drops it half way.
    pub fn connections(&self, registry: &CommandRegistry) -> Result<Vec<Connection>, CliError> {
        let store = command_set(registry)?.connections();
        let connections = self.block_on(async {
            let connections = store.get_all().await;
            store.wait_for_migrations().await;
            connections
        })?;
        Ok(connections)
    }

    /// Loads credential metadata through the registry's store
    pub fn credentials(&self, registry: &CommandRegistry) -> Result<Vec<CredentialMeta>, CliError> {
        let commands = command_set(registry)?;
        Ok(self.block_on(commands.credentials().list_metadata())?)
    }
}

/// Registered command set of an initialized registry
pub fn command_set(registry: &CommandRegistry) -> Result<&CommandSet, CliError> {
    Ok(registry.commands().ok_or(RegistryError::NotInitialized)?)
}

/// Maps the `--credential` flag onto the credential picker's answers
pub fn credential_answer(value: &str) -> String {
    if value.eq_ignore_ascii_case("none") {
        NO_CREDENTIAL_ITEM.to_string()
    } else {
        value.to_string()
    }
}
