//! Prompt layer
//!
//! Commands collect their inputs through a [`Prompter`] supplied by the host.
//! Every prompt answers `Ok(None)` when the user cancels; commands stop at the
//! first cancellation without touching the stores.
//!
//! Each prompt carries a stable `key` (see [`keys`]) so hosts can answer some
//! prompts up front, e.g. from command-line flags.

use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::{CommandResult, ValidationError};
use crate::models::{Connection, CredentialMeta};
use crate::transfer::TRANSFER_FILE_EXTENSION;
use crate::validation::{validate_group, validate_hostname, validate_password, validate_username};

/// Stable prompt keys
pub mod keys {
    /// Hostname of a connection
    pub const HOSTNAME: &str = "hostname";
    /// Group of a connection
    pub const GROUP: &str = "group";
    /// Credential picker
    pub const CREDENTIAL: &str = "credential";
    /// Credential username
    pub const USERNAME: &str = "username";
    /// Credential password
    pub const PASSWORD: &str = "password";
    /// Connection picker
    pub const CONNECTION: &str = "connection";
    /// Existing group picker
    pub const GROUP_PICK: &str = "group-pick";
    /// Destructive-action confirmation
    pub const CONFIRM: &str = "confirm";
    /// File to import
    pub const IMPORT_FILE: &str = "import-file";
    /// File to export to
    pub const EXPORT_FILE: &str = "export-file";
}

/// Checks a text answer before it is accepted
pub type TextValidator = fn(&str) -> Result<(), ValidationError>;

/// Free-text input
#[derive(Debug, Clone)]
pub struct TextPrompt {
    /// Stable key
    pub key: &'static str,
    /// Question shown to the user
    pub title: String,
    /// Pre-filled value
    pub initial: Option<String>,
    /// Hide the input while typing
    pub password: bool,
    /// Accept an empty answer
    pub allow_empty: bool,
    /// Input check; hosts re-ask while it fails
    pub validator: Option<TextValidator>,
}

impl TextPrompt {
    /// Creates a required text prompt
    #[must_use]
    pub fn new(key: &'static str, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            initial: None,
            password: false,
            allow_empty: false,
            validator: None,
        }
    }

    /// Pre-fills the answer
    #[must_use]
    pub fn with_initial(mut self, initial: Option<&str>) -> Self {
        self.initial = initial.map(ToString::to_string);
        self
    }

    /// Hides the input
    #[must_use]
    pub const fn masked(mut self) -> Self {
        self.password = true;
        self
    }

    /// Allows an empty answer
    #[must_use]
    pub const fn optional(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Sets the input check
    #[must_use]
    pub const fn with_validator(mut self, validator: TextValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Runs the input check on an answer
    ///
    /// # Errors
    ///
    /// Returns the validation failure to show to the user.
    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() && !self.allow_empty {
            return Err(ValidationError::Empty { field: self.key });
        }
        match self.validator {
            Some(validate) if !(value.is_empty() && self.allow_empty) => validate(value),
            _ => Ok(()),
        }
    }
}

/// One entry of a pick list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    /// Record id behind the entry, if any
    pub id: Option<String>,
    /// Text shown
    pub label: String,
    /// Secondary text
    pub description: Option<String>,
}

impl PickItem {
    /// Entry for a record
    #[must_use]
    pub fn record(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.into(),
            description: None,
        }
    }

    /// Entry not tied to a record
    #[must_use]
    pub fn action(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            description: None,
        }
    }

    /// Adds secondary text
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Choice from a list
#[derive(Debug, Clone)]
pub struct PickPrompt {
    /// Stable key
    pub key: &'static str,
    /// Question shown to the user
    pub title: String,
    /// Entries to choose from
    pub items: Vec<PickItem>,
    /// Entry selected up front
    pub selected: Option<usize>,
}

impl PickPrompt {
    /// Creates a pick prompt
    #[must_use]
    pub fn new(key: &'static str, title: impl Into<String>, items: Vec<PickItem>) -> Self {
        Self {
            key,
            title: title.into(),
            items,
            selected: None,
        }
    }

    /// Preselects an entry
    #[must_use]
    pub const fn with_selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    /// Index of the entry whose id or label matches `answer`
    ///
    /// Ids match exactly; labels match case-insensitively.
    #[must_use]
    pub fn find(&self, answer: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.id.as_deref() == Some(answer))
            .or_else(|| {
                self.items
                    .iter()
                    .position(|item| item.label.eq_ignore_ascii_case(answer))
            })
    }
}

/// Yes/no question
#[derive(Debug, Clone)]
pub struct ConfirmPrompt {
    /// Stable key
    pub key: &'static str,
    /// Question shown to the user
    pub message: String,
}

impl ConfirmPrompt {
    /// Creates a confirmation prompt
    #[must_use]
    pub fn new(key: &'static str, message: impl Into<String>) -> Self {
        Self {
            key,
            message: message.into(),
        }
    }
}

/// File chooser
#[derive(Debug, Clone)]
pub struct FilePrompt {
    /// Stable key
    pub key: &'static str,
    /// Question shown to the user
    pub title: String,
    /// Suggested file name for save dialogs
    pub default_name: Option<String>,
    /// Expected extension, without the dot
    pub extension: &'static str,
}

/// Source of user input supplied by the host
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Asks for free text
    async fn input_text(&self, prompt: &TextPrompt) -> CommandResult<Option<String>>;

    /// Asks for one entry of a list; returns its index
    async fn pick(&self, prompt: &PickPrompt) -> CommandResult<Option<usize>>;

    /// Asks a yes/no question
    async fn confirm(&self, prompt: &ConfirmPrompt) -> CommandResult<Option<bool>>;

    /// Asks for an existing file
    async fn open_file(&self, prompt: &FilePrompt) -> CommandResult<Option<PathBuf>>;

    /// Asks for a destination file
    async fn save_file(&self, prompt: &FilePrompt) -> CommandResult<Option<PathBuf>>;
}

/// Inputs for a new connection
#[derive(Debug, Clone)]
pub struct ConnectionInput {
    /// Host name
    pub hostname: String,
    /// Credential to use
    pub credential: CredentialChoice,
    /// Group label, `None` for ungrouped
    pub group: Option<String>,
}

/// Inputs for a new credential
#[derive(Debug, Clone)]
pub struct CredentialInput {
    /// Login name
    pub username: String,
    /// Password
    pub password: SecretString,
}

/// Answer of the credential picker
#[derive(Debug, Clone)]
pub enum CredentialChoice {
    /// An existing credential id
    Existing(String),
    /// No credential
    None,
    /// Create a credential from these inputs
    New(CredentialInput),
}

/// Label of the "no credential" pick entry
pub const NO_CREDENTIAL_ITEM: &str = "(none)";
/// Label of the "create credential" pick entry
pub const NEW_CREDENTIAL_ITEM: &str = "New credential...";
/// Label of the "enter credentials once" pick entry
pub const ONE_OFF_CREDENTIAL_ITEM: &str = "Enter credentials for this session";

/// Asks for a hostname
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_hostname(
    prompter: &dyn Prompter,
    initial: Option<&str>,
) -> CommandResult<Option<String>> {
    let prompt = TextPrompt::new(keys::HOSTNAME, "Hostname or IP address")
        .with_initial(initial)
        .with_validator(validate_hostname);
    Ok(prompter
        .input_text(&prompt)
        .await?
        .map(|h| h.trim().to_string()))
}

/// Asks for a group; an empty answer means ungrouped
///
/// Returns `Some(None)` for "no group" and `None` on cancellation.
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_group(
    prompter: &dyn Prompter,
    initial: Option<&str>,
) -> CommandResult<Option<Option<String>>> {
    let prompt = TextPrompt::new(keys::GROUP, "Group (leave empty for none)")
        .with_initial(initial)
        .optional()
        .with_validator(|g| validate_group(Some(g)));
    Ok(prompter
        .input_text(&prompt)
        .await?
        .map(|g| crate::models::normalize_group(Some(&g))))
}

/// Asks for a username and password
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_new_credential(
    prompter: &dyn Prompter,
    initial_username: Option<&str>,
) -> CommandResult<Option<CredentialInput>> {
    let username = TextPrompt::new(keys::USERNAME, "Username")
        .with_initial(initial_username)
        .with_validator(validate_username);
    let Some(username) = prompter.input_text(&username).await? else {
        return Ok(None);
    };

    let password = TextPrompt::new(keys::PASSWORD, "Password")
        .masked()
        .with_validator(validate_password);
    let Some(password) = prompter.input_text(&password).await? else {
        return Ok(None);
    };

    Ok(Some(CredentialInput {
        username: username.trim().to_string(),
        password: SecretString::from(password),
    }))
}

fn credential_items(credentials: &[CredentialMeta]) -> Vec<PickItem> {
    credentials
        .iter()
        .map(|c| PickItem::record(c.id.clone(), c.username.clone()))
        .collect()
}

/// Asks which credential to use
///
/// `allow_new` adds an entry that collects a new username and password.
/// `current` preselects the credential already in use (or "none").
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_credential_choice(
    prompter: &dyn Prompter,
    credentials: &[CredentialMeta],
    allow_new: bool,
    current: Option<&str>,
) -> CommandResult<Option<CredentialChoice>> {
    let mut items = credential_items(credentials);
    items.push(PickItem::action(NO_CREDENTIAL_ITEM));
    if allow_new {
        items.push(PickItem::action(NEW_CREDENTIAL_ITEM));
    }

    let selected = match current {
        Some(id) => credentials.iter().position(|c| c.id == id),
        None => Some(credentials.len()),
    };
    let prompt = PickPrompt::new(keys::CREDENTIAL, "Credential", items).with_selected(selected);
    let Some(index) = prompter.pick(&prompt).await? else {
        return Ok(None);
    };

    if let Some(credential) = credentials.get(index) {
        return Ok(Some(CredentialChoice::Existing(credential.id.clone())));
    }
    if index == credentials.len() {
        return Ok(Some(CredentialChoice::None));
    }
    if allow_new && index == credentials.len() + 1 {
        return Ok(prompt_new_credential(prompter, None)
            .await?
            .map(CredentialChoice::New));
    }
    Ok(None)
}

/// Asks for all inputs of a new connection
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_new_connection(
    prompter: &dyn Prompter,
    credentials: &[CredentialMeta],
) -> CommandResult<Option<ConnectionInput>> {
    let Some(hostname) = prompt_hostname(prompter, None).await? else {
        return Ok(None);
    };
    let Some(credential) = prompt_credential_choice(prompter, credentials, true, None).await? else {
        return Ok(None);
    };
    let Some(group) = prompt_group(prompter, None).await? else {
        return Ok(None);
    };

    Ok(Some(ConnectionInput {
        hostname,
        credential,
        group,
    }))
}

/// Asks for the edited fields of an existing connection
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_edit_connection(
    prompter: &dyn Prompter,
    connection: &Connection,
    credentials: &[CredentialMeta],
) -> CommandResult<Option<ConnectionInput>> {
    let Some(hostname) = prompt_hostname(prompter, Some(&connection.hostname)).await? else {
        return Ok(None);
    };
    let Some(credential) = prompt_credential_choice(
        prompter,
        credentials,
        true,
        connection.credential_id.as_deref(),
    )
    .await?
    else {
        return Ok(None);
    };
    let Some(group) = prompt_group(prompter, connection.group_name()).await? else {
        return Ok(None);
    };

    Ok(Some(ConnectionInput {
        hostname,
        credential,
        group,
    }))
}

/// Asks which connection to act on
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_connection_choice(
    prompter: &dyn Prompter,
    connections: &[Connection],
    title: &str,
) -> CommandResult<Option<String>> {
    let items = connections
        .iter()
        .map(|c| {
            let item = PickItem::record(c.id.clone(), c.hostname.clone());
            match c.group_name() {
                Some(group) => item.with_description(group),
                None => item,
            }
        })
        .collect();

    let prompt = PickPrompt::new(keys::CONNECTION, title, items);
    Ok(prompter
        .pick(&prompt)
        .await?
        .and_then(|i| connections.get(i))
        .map(|c| c.id.clone()))
}

/// Asks which existing credential to act on
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_existing_credential(
    prompter: &dyn Prompter,
    credentials: &[CredentialMeta],
    title: &str,
) -> CommandResult<Option<String>> {
    let prompt = PickPrompt::new(keys::CREDENTIAL, title, credential_items(credentials));
    Ok(prompter
        .pick(&prompt)
        .await?
        .and_then(|i| credentials.get(i))
        .map(|c| c.id.clone()))
}

/// Asks which existing group to act on
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn prompt_existing_group(
    prompter: &dyn Prompter,
    groups: &[String],
) -> CommandResult<Option<String>> {
    let items = groups.iter().map(PickItem::action).collect();
    let prompt = PickPrompt::new(keys::GROUP_PICK, "Group", items);
    Ok(prompter
        .pick(&prompt)
        .await?
        .and_then(|i| groups.get(i))
        .cloned())
}

/// Asks for confirmation; cancelling counts as "no"
///
/// # Errors
///
/// Propagates prompter failures.
pub async fn confirm(prompter: &dyn Prompter, message: impl Into<String>) -> CommandResult<bool> {
    Ok(prompter
        .confirm(&ConfirmPrompt::new(keys::CONFIRM, message))
        .await?
        .unwrap_or(false))
}

/// File prompt for importing a connection list
#[must_use]
pub fn import_file_prompt() -> FilePrompt {
    FilePrompt {
        key: keys::IMPORT_FILE,
        title: "Import connections".to_string(),
        default_name: None,
        extension: TRANSFER_FILE_EXTENSION,
    }
}

/// File prompt for exporting the connection list
#[must_use]
pub fn export_file_prompt() -> FilePrompt {
    FilePrompt {
        key: keys::EXPORT_FILE,
        title: "Export connections".to_string(),
        default_name: Some(format!("rdpman-connections.{TRANSFER_FILE_EXTENSION}")),
        extension: TRANSFER_FILE_EXTENSION,
    }
}
