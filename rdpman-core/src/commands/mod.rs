//! User-facing commands
//!
//! Each command collects its inputs through the host's [`Prompter`], calls the
//! stores and asks the host to refresh its views. A cancelled prompt ends the
//! command quietly. Any error is logged and shown to the user exactly once as
//! `Failed to <operation>: <message>`.
//!
//! Hosts register the commands once through [`CommandRegistry`] and dispatch
//! them by identifier (`rdpman.<name>`).

mod connections;
mod credentials;
mod registry;
mod session;
mod transfer;

pub use registry::CommandRegistry;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::Instrument;

use crate::config::RdpDefaults;
use crate::drag_drop::DropTarget;
use crate::error::{CommandResult, RegistryError};
use crate::prompt::Prompter;
use crate::rdp::RdpLauncher;
use crate::storage::StoreContext;
use crate::store::{ConnectionStore, CredentialStore};
use crate::tracing::span_names;

/// Prefix shared by all command identifiers
pub const COMMAND_PREFIX: &str = "rdpman.";

/// Every command the registry exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    /// Create a connection
    CreateConnection,
    /// Edit a connection
    UpdateConnection,
    /// Delete a connection
    DeleteConnection,
    /// Launch a session
    Connect,
    /// Import a connection list
    ImportConnections,
    /// Export the connection list
    ExportConnections,
    /// Create a credential
    CreateCredential,
    /// Edit a credential
    UpdateCredential,
    /// Delete a credential
    DeleteCredential,
    /// Set one credential on a whole group
    AssignGroupCredentials,
    /// Regroup connections (drag and drop)
    MoveConnections,
    /// Refresh the views
    Refresh,
}

impl CommandId {
    /// All commands in registration order
    pub const ALL: [Self; 12] = [
        Self::CreateConnection,
        Self::UpdateConnection,
        Self::DeleteConnection,
        Self::Connect,
        Self::ImportConnections,
        Self::ExportConnections,
        Self::CreateCredential,
        Self::UpdateCredential,
        Self::DeleteCredential,
        Self::AssignGroupCredentials,
        Self::MoveConnections,
        Self::Refresh,
    ];

    /// Name without the prefix
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CreateConnection => "createConnection",
            Self::UpdateConnection => "updateConnection",
            Self::DeleteConnection => "deleteConnection",
            Self::Connect => "connect",
            Self::ImportConnections => "importConnections",
            Self::ExportConnections => "exportConnections",
            Self::CreateCredential => "createCredential",
            Self::UpdateCredential => "updateCredential",
            Self::DeleteCredential => "deleteCredential",
            Self::AssignGroupCredentials => "assignGroupCredentials",
            Self::MoveConnections => "moveConnections",
            Self::Refresh => "refresh",
        }
    }

    /// Full identifier, e.g. `rdpman.createConnection`
    #[must_use]
    pub fn id(self) -> String {
        format!("{COMMAND_PREFIX}{}", self.name())
    }

    /// Verb phrase used in failure messages
    #[must_use]
    pub const fn operation(self) -> &'static str {
        match self {
            Self::CreateConnection => "create connection",
            Self::UpdateConnection => "update connection",
            Self::DeleteConnection => "delete connection",
            Self::Connect => "connect",
            Self::ImportConnections => "import connections",
            Self::ExportConnections => "export connections",
            Self::CreateCredential => "create credential",
            Self::UpdateCredential => "update credential",
            Self::DeleteCredential => "delete credential",
            Self::AssignGroupCredentials => "assign group credentials",
            Self::MoveConnections => "move connections",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COMMAND_PREFIX}{}", self.name())
    }
}

impl FromStr for CommandId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix(COMMAND_PREFIX).unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|id| id.name() == name)
            .ok_or_else(|| RegistryError::UnknownCommand(s.to_string()))
    }
}

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Ran to completion
    Completed,
    /// The user cancelled a prompt
    Cancelled,
    /// An error was reported to the user
    Failed,
}

/// Context a command was invoked with
///
/// Tree-view hosts fill in the item the command was run on; commands prompt
/// for whatever is missing.
#[derive(Debug, Clone, Default)]
pub struct CommandArgs {
    /// Connection or credential the command targets
    pub target_id: Option<String>,
    /// Connections being dragged
    pub dragged_ids: Vec<String>,
    /// Where they were dropped
    pub drop_target: Option<DropTarget>,
}

impl CommandArgs {
    /// Arguments targeting one record
    #[must_use]
    pub fn target(id: impl Into<String>) -> Self {
        Self {
            target_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Arguments for a drop
    #[must_use]
    pub fn drop(dragged_ids: Vec<String>, target: DropTarget) -> Self {
        Self {
            dragged_ids,
            drop_target: Some(target),
            ..Self::default()
        }
    }
}

/// View and notification surface supplied by the host
pub trait ViewHost: Send + Sync {
    /// Re-reads the stores and redraws the views
    fn refresh(&self);

    /// Shows an informational message
    fn notify_info(&self, message: &str);

    /// Shows an error message
    fn notify_error(&self, message: &str);

    /// Shows a block of text, e.g. a dry-run launch plan
    fn show_document(&self, title: &str, content: &str) {
        self.notify_info(&format!("{title}\n{content}"));
    }
}

/// Result of a command body before it is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Done,
    Cancelled,
}

/// Ends a command body when a prompt was cancelled
macro_rules! answer_or_cancel {
    ($prompt:expr) => {
        match $prompt.await? {
            Some(value) => value,
            None => return Ok($crate::commands::Flow::Cancelled),
        }
    };
}
pub(crate) use answer_or_cancel;

/// Everything the command bodies need
pub struct Commands {
    pub(crate) connections: ConnectionStore,
    pub(crate) credentials: CredentialStore,
    pub(crate) prompter: Arc<dyn Prompter>,
    pub(crate) host: Arc<dyn ViewHost>,
    pub(crate) launcher: RdpLauncher,
    pub(crate) rdp_defaults: RdpDefaults,
}

impl fmt::Debug for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Commands")
            .field("connections", &self.connections)
            .field("launcher", &self.launcher)
            .finish_non_exhaustive()
    }
}

impl Commands {
    /// Creates the command set over a persistence context
    #[must_use]
    pub fn new(ctx: StoreContext, prompter: Arc<dyn Prompter>, host: Arc<dyn ViewHost>) -> Self {
        Self {
            connections: ConnectionStore::new(ctx.clone()),
            credentials: CredentialStore::new(ctx),
            prompter,
            host,
            launcher: RdpLauncher::new(),
            rdp_defaults: RdpDefaults::default(),
        }
    }

    /// Replaces the connection store, e.g. to install a migration hook
    #[must_use]
    pub fn with_connection_store(mut self, connections: ConnectionStore) -> Self {
        self.connections = connections;
        self
    }

    /// Replaces the session launcher
    #[must_use]
    pub fn with_launcher(mut self, launcher: RdpLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    /// Sets the defaults for launched sessions
    #[must_use]
    pub fn with_rdp_defaults(mut self, defaults: RdpDefaults) -> Self {
        self.rdp_defaults = defaults;
        self
    }

    /// Connection store used by the commands
    #[must_use]
    pub const fn connections(&self) -> &ConnectionStore {
        &self.connections
    }

    /// Credential store used by the commands
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub(crate) fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    /// Runs one command and reports its outcome to the host
    pub async fn run(&self, id: CommandId, args: CommandArgs) -> CommandStatus {
        let span = tracing::info_span!(span_names::COMMAND_EXECUTE, command = id.name());
        let result = self.dispatch(id, args).instrument(span).await;

        match result {
            Ok(Flow::Done) => CommandStatus::Completed,
            Ok(Flow::Cancelled) => {
                tracing::debug!(command = id.name(), "Command cancelled");
                CommandStatus::Cancelled
            }
            Err(e) => {
                tracing::error!(command = id.name(), code = e.code(), error = %e, "Command failed");
                self.host
                    .notify_error(&format!("Failed to {}: {e}", id.operation()));
                CommandStatus::Failed
            }
        }
    }

    async fn dispatch(&self, id: CommandId, args: CommandArgs) -> CommandResult<Flow> {
        match id {
            CommandId::CreateConnection => self.create_connection().await,
            CommandId::UpdateConnection => self.update_connection(args).await,
            CommandId::DeleteConnection => self.delete_connection(args).await,
            CommandId::Connect => self.connect(args).await,
            CommandId::ImportConnections => self.import_connections().await,
            CommandId::ExportConnections => self.export_connections().await,
            CommandId::CreateCredential => self.create_credential().await,
            CommandId::UpdateCredential => self.update_credential(args).await,
            CommandId::DeleteCredential => self.delete_credential(args).await,
            CommandId::AssignGroupCredentials => self.assign_group_credentials().await,
            CommandId::MoveConnections => self.move_connections(args).await,
            CommandId::Refresh => {
                self.host.refresh();
                Ok(Flow::Done)
            }
        }
    }
}
