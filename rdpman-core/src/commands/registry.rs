//! Once-only command registration

use crate::error::RegistryError;

use super::{CommandArgs, CommandId, CommandStatus, Commands};

/// Owns the registered commands
///
/// Registration happens exactly once through [`CommandRegistry::initialize`];
/// a second call is rejected instead of registering everything twice.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Option<Commands>,
    registered: Vec<CommandId>,
}

impl CommandRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once `initialize` has succeeded
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.commands.is_some()
    }

    /// Registers every command
    ///
    /// # Errors
    ///
    /// Returns `AlreadyInitialized` on a second call; the first registration
    /// stays in place.
    pub fn initialize(&mut self, commands: Commands) -> Result<&[CommandId], RegistryError> {
        if self.commands.is_some() {
            tracing::warn!("Command registration requested twice");
            return Err(RegistryError::AlreadyInitialized);
        }

        self.commands = Some(commands);
        self.registered = CommandId::ALL.to_vec();
        tracing::debug!(count = self.registered.len(), "Commands registered");
        Ok(&self.registered)
    }

    /// Registered commands, empty before `initialize`
    #[must_use]
    pub fn registered(&self) -> &[CommandId] {
        &self.registered
    }

    /// Registered command set
    #[must_use]
    pub const fn commands(&self) -> Option<&Commands> {
        self.commands.as_ref()
    }

    /// Runs a command by identifier (`rdpman.<name>`)
    ///
    /// # Errors
    ///
    /// Returns `NotInitialized` before `initialize` and `UnknownCommand` for
    /// identifiers that were never registered. Failures inside the command
    /// are reported to the host and surface as [`CommandStatus::Failed`].
    pub async fn execute(&self, id: &str, args: CommandArgs) -> Result<CommandStatus, RegistryError> {
        let commands = self.commands.as_ref().ok_or(RegistryError::NotInitialized)?;
        let command: CommandId = id.parse()?;
        if !self.registered.contains(&command) {
            return Err(RegistryError::UnknownCommand(id.to_string()));
        }
        Ok(commands.run(command, args).await)
    }
}
