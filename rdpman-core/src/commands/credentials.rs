//! Credential commands

use secrecy::ExposeSecret;

use crate::error::{CommandResult, StoreError};
use crate::models::CredentialMeta;
use crate::prompt::{
    self, CredentialChoice, TextPrompt, keys, prompt_existing_credential, prompt_new_credential,
};
use crate::validation::{validate_password, validate_username};

use super::{CommandArgs, Commands, Flow, answer_or_cancel};

impl Commands {
    /// Turns a picker answer into a credential id, creating the credential if asked to
    pub(crate) async fn resolve_credential_choice(
        &self,
        choice: CredentialChoice,
    ) -> CommandResult<Option<String>> {
        match choice {
            CredentialChoice::Existing(id) => Ok(Some(id)),
            CredentialChoice::None => Ok(None),
            CredentialChoice::New(input) => {
                let id = self
                    .credentials
                    .create(&input.username, input.password.expose_secret())
                    .await?;
                Ok(Some(id))
            }
        }
    }

    async fn choose_credential(
        &self,
        args: &CommandArgs,
        title: &str,
    ) -> CommandResult<Option<CredentialMeta>> {
        let credentials = self.credentials.list_metadata().await?;
        if let Some(id) = &args.target_id {
            return credentials
                .into_iter()
                .find(|c| &c.id == id)
                .map(Some)
                .ok_or_else(|| StoreError::CredentialNotFound(id.clone()).into());
        }

        if credentials.is_empty() {
            self.host.notify_info("No credentials saved yet");
            return Ok(None);
        }

        let Some(id) = prompt_existing_credential(self.prompter(), &credentials, title).await?
        else {
            return Ok(None);
        };
        Ok(credentials.into_iter().find(|c| c.id == id))
    }

    pub(super) async fn create_credential(&self) -> CommandResult<Flow> {
        let input = answer_or_cancel!(prompt_new_credential(self.prompter(), None));
        self.credentials
            .create(&input.username, input.password.expose_secret())
            .await?;

        self.host.refresh();
        self.host
            .notify_info(&format!("Credential '{}' created", input.username));
        Ok(Flow::Done)
    }

    pub(super) async fn update_credential(&self, args: CommandArgs) -> CommandResult<Flow> {
        let credential = answer_or_cancel!(self.choose_credential(&args, "Credential to edit"));

        let username = TextPrompt::new(keys::USERNAME, "Username")
            .with_initial(Some(&credential.username))
            .with_validator(validate_username);
        let username = answer_or_cancel!(self.prompter().input_text(&username));

        let password = TextPrompt::new(keys::PASSWORD, "New password")
            .masked()
            .with_validator(validate_password);
        let password = answer_or_cancel!(self.prompter().input_text(&password));

        self.credentials
            .update(&credential.id, username.trim(), &password)
            .await?;

        self.host.refresh();
        self.host
            .notify_info(&format!("Credential '{}' updated", username.trim()));
        Ok(Flow::Done)
    }

    pub(super) async fn delete_credential(&self, args: CommandArgs) -> CommandResult<Flow> {
        let credential =
            answer_or_cancel!(self.choose_credential(&args, "Credential to delete"));

        let in_use = self
            .connections
            .count_using_credential(&credential.id)
            .await?;
        let message = if in_use > 0 {
            format!(
                "Delete credential '{}'? {in_use} connection(s) will lose it.",
                credential.username
            )
        } else {
            format!("Delete credential '{}'?", credential.username)
        };
        if !prompt::confirm(self.prompter(), message).await? {
            return Ok(Flow::Cancelled);
        }

        let cleared = self
            .connections
            .clear_credential_reference(&credential.id)
            .await?;
        self.credentials.delete(&credential.id).await?;

        self.host.refresh();
        self.host.notify_info(&format!(
            "Credential '{}' deleted; {cleared} connection(s) updated",
            credential.username
        ));
        Ok(Flow::Done)
    }
}
