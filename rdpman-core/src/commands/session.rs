//! Launching a session for a saved connection

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use crate::error::CommandResult;
use crate::models::{Connection, Credential};
use crate::prompt::{ONE_OFF_CREDENTIAL_ITEM, PickItem, PickPrompt, keys, prompt_new_credential};
use crate::rdp::{LaunchOutcome, RdpSettings};
use crate::tracing::span_names;

use super::{CommandArgs, Commands, Flow, answer_or_cancel};

struct SessionLogin {
    username: String,
    password: SecretString,
}

impl Commands {
    /// Stored credential of the connection, if it has one with a password
    async fn assigned_login(&self, connection: &Connection) -> CommandResult<Option<SessionLogin>> {
        let Some(credential_id) = connection.credential_id.as_deref() else {
            return Ok(None);
        };
        Ok(self
            .credentials
            .get_with_password_by_id(credential_id)
            .await?
            .map(|c| SessionLogin {
                username: c.username,
                password: c.password,
            }))
    }

    /// Lets the user pick a stored credential or type one in for this launch
    async fn choose_login(&self) -> CommandResult<Option<SessionLogin>> {
        let credentials: Vec<_> = self
            .credentials
            .get_all()
            .await?
            .into_iter()
            .filter(Credential::has_password)
            .collect();

        let mut items: Vec<_> = credentials
            .iter()
            .map(|c| PickItem::record(c.id.clone(), c.username.clone()))
            .collect();
        items.push(PickItem::action(ONE_OFF_CREDENTIAL_ITEM));

        let prompt = PickPrompt::new(keys::CREDENTIAL, "Log in as", items);
        let Some(index) = self.prompter().pick(&prompt).await? else {
            return Ok(None);
        };

        if let Some(credential) = credentials.into_iter().nth(index) {
            return Ok(Some(SessionLogin {
                username: credential.username,
                password: credential.password,
            }));
        }

        Ok(prompt_new_credential(self.prompter(), None)
            .await?
            .map(|input| SessionLogin {
                username: input.username,
                password: input.password,
            }))
    }

    pub(super) async fn connect(&self, args: CommandArgs) -> CommandResult<Flow> {
        let connection = answer_or_cancel!(self.choose_connection(&args, "Connect to"));

        let login = match self.assigned_login(&connection).await? {
            Some(login) => login,
            None => answer_or_cancel!(self.choose_login()),
        };

        let settings =
            RdpSettings::from_defaults(&connection.hostname, &login.username, &self.rdp_defaults);
        let span = tracing::info_span!(span_names::SESSION_LAUNCH, connection_id = %connection.id);
        let outcome = self
            .launcher
            .launch(&settings, login.password.expose_secret())
            .instrument(span)
            .await?;

        match outcome {
            LaunchOutcome::Launched { .. } => {
                self.host
                    .notify_info(&format!("Connecting to {}", connection.hostname));
            }
            LaunchOutcome::DryRun(plan) => {
                let mut content = format!("{}\n", plan.rdp_file.display());
                content.push_str(&plan.payload.replace("\r\n", "\n"));
                for command in plan.commands() {
                    content.push_str(&command.masked());
                    content.push('\n');
                }
                self.host.show_document(
                    &format!("Launch plan for {}", connection.hostname),
                    content.trim_end(),
                );
            }
        }
        Ok(Flow::Done)
    }
}
