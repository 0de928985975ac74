//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// `rdpman` command-line interface for managing RDP connections
#[derive(Parser)]
#[command(name = "rdpman-cli")]
#[command(author, version, about = "rdpman command-line interface")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Never prompt; missing answers cancel the command
    #[arg(long, global = true, env = "RDPMAN_NO_INPUT")]
    pub no_input: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List all connections
    #[command(about = "List all connections in the catalog")]
    List {
        /// Output format for the connection list
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,

        /// Filter connections by group name
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Show connections grouped as a tree
    #[command(about = "Show connections grouped the way the tree view shows them")]
    Tree,

    /// Add a new connection
    #[command(about = "Add a new connection to the catalog")]
    Add {
        /// Host address (hostname or IP, optionally with :port)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Group to file the connection under
        #[arg(short, long)]
        group: Option<String>,

        /// Credential username or ID ("none" for no credential)
        #[arg(short = 'C', long)]
        credential: Option<String>,
    },

    /// Edit a connection
    #[command(about = "Edit an existing connection")]
    Edit {
        /// Connection hostname or ID
        connection: String,

        /// New host address
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// New group (empty string to ungroup)
        #[arg(short, long)]
        group: Option<String>,

        /// Credential username or ID ("none" to clear)
        #[arg(short = 'C', long)]
        credential: Option<String>,
    },

    /// Delete a connection
    #[command(about = "Delete a connection")]
    Delete {
        /// Connection hostname or ID
        connection: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Connect to a server by hostname or ID
    #[command(about = "Launch a remote-desktop session")]
    Connect {
        /// Connection hostname or ID
        connection: String,

        /// Credential username or ID for connections without one
        #[arg(short = 'C', long)]
        credential: Option<String>,

        /// Show the launch plan without running anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Import connections from a JSON file
    #[command(about = "Import a connection list")]
    Import {
        /// Input file path
        file: PathBuf,
    },

    /// Export connections to a JSON file
    #[command(about = "Export the connection list")]
    Export {
        /// Output file path
        file: PathBuf,
    },

    /// Move connections to another group
    #[command(about = "Move connections to a group, to the root, or next to another connection")]
    Move(MoveArgs),

    /// Set one credential on every connection of a group
    #[command(name = "assign-group", about = "Assign a credential to a whole group")]
    AssignGroup {
        /// Group name
        group: String,

        /// Credential username or ID ("none" to clear)
        #[arg(short = 'C', long)]
        credential: String,
    },

    /// Credential management
    #[command(subcommand)]
    Credential(CredentialCommands),

    /// Migrate legacy connection records now
    #[command(about = "Run the legacy data migration and print a report")]
    Migrate,

    /// Generate shell completions
    #[command(about = "Generate shell completions for bash, zsh, fish, etc.")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments of `move`
#[derive(Args)]
pub struct MoveArgs {
    /// Connections to move (hostname or ID)
    #[arg(required = true)]
    pub connections: Vec<String>,

    /// Destination group
    #[arg(short, long, conflicts_with_all = ["root", "onto"])]
    pub group: Option<String>,

    /// Move out of any group
    #[arg(long, conflicts_with = "onto")]
    pub root: bool,

    /// Move into the group of this connection
    #[arg(long)]
    pub onto: Option<String>,
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON array
    Json,
    /// Comma-separated values
    Csv,
}

/// Credential subcommands
#[derive(Subcommand)]
pub enum CredentialCommands {
    /// List credentials (passwords are never shown)
    List {
        /// Output format
        #[arg(short, long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Add a credential
    Add {
        /// Login name
        #[arg(short, long)]
        username: Option<String>,

        /// Read the password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Edit a credential
    Edit {
        /// Credential username or ID
        credential: String,

        /// New login name
        #[arg(short, long)]
        username: Option<String>,

        /// Read the new password from the first line of stdin
        #[arg(long)]
        password_stdin: bool,
    },

    /// Delete a credential and clear it from every connection
    Delete {
        /// Credential username or ID
        credential: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}
