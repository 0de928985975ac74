//! Connection commands

use crate::drag_drop::DropTarget;
use crate::error::{CommandError, CommandResult, StoreError};
use crate::models::Connection;
use crate::prompt::{
    self, prompt_connection_choice, prompt_credential_choice, prompt_edit_connection,
    prompt_existing_group, prompt_group, prompt_new_connection,
};

use super::{CommandArgs, Commands, Flow, answer_or_cancel};

impl Commands {
    /// Resolves the connection a command acts on, prompting if needed
    pub(crate) async fn choose_connection(
        &self,
        args: &CommandArgs,
        title: &str,
    ) -> CommandResult<Option<Connection>> {
        if let Some(id) = &args.target_id {
            return self
                .connections
                .get_by_id(id)
                .await?
                .map(Some)
                .ok_or_else(|| StoreError::ConnectionNotFound(id.clone()).into());
        }

        let connections = self.connections.get_all().await?;
        if connections.is_empty() {
            self.host.notify_info("No connections saved yet");
            return Ok(None);
        }

        let Some(id) = prompt_connection_choice(self.prompter(), &connections, title).await? else {
            return Ok(None);
        };
        Ok(connections.into_iter().find(|c| c.id == id))
    }

    pub(super) async fn create_connection(&self) -> CommandResult<Flow> {
        let credentials = self.credentials.list_metadata().await?;
        let input = answer_or_cancel!(prompt_new_connection(self.prompter(), &credentials));

        let credential_id = self.resolve_credential_choice(input.credential).await?;
        let id = self
            .connections
            .create(&input.hostname, credential_id.as_deref(), input.group.as_deref())
            .await?;

        tracing::debug!(connection_id = %id, "Created connection from prompts");
        self.host.refresh();
        self.host
            .notify_info(&format!("Connection '{}' created", input.hostname));
        Ok(Flow::Done)
    }

    pub(super) async fn update_connection(&self, args: CommandArgs) -> CommandResult<Flow> {
        let connection = answer_or_cancel!(self.choose_connection(&args, "Connection to edit"));
        let credentials = self.credentials.list_metadata().await?;
        let input = answer_or_cancel!(prompt_edit_connection(
            self.prompter(),
            &connection,
            &credentials
        ));

        let credential_id = self.resolve_credential_choice(input.credential).await?;
        self.connections
            .update(
                &connection.id,
                &input.hostname,
                credential_id.as_deref(),
                input.group.as_deref(),
            )
            .await?;

        self.host.refresh();
        self.host
            .notify_info(&format!("Connection '{}' updated", input.hostname));
        Ok(Flow::Done)
    }

    pub(super) async fn delete_connection(&self, args: CommandArgs) -> CommandResult<Flow> {
        let connection = answer_or_cancel!(self.choose_connection(&args, "Connection to delete"));
        if !prompt::confirm(
            self.prompter(),
            format!("Delete connection '{}'?", connection.hostname),
        )
        .await?
        {
            return Ok(Flow::Cancelled);
        }

        if self.connections.delete(&connection.id).await? {
            self.host.refresh();
            self.host
                .notify_info(&format!("Connection '{}' deleted", connection.hostname));
        }
        Ok(Flow::Done)
    }

    pub(super) async fn assign_group_credentials(&self) -> CommandResult<Flow> {
        let groups = self.connections.groups().await?;
        if groups.is_empty() {
            self.host.notify_info("No groups to assign a credential to");
            return Ok(Flow::Cancelled);
        }

        let group = answer_or_cancel!(prompt_existing_group(self.prompter(), &groups));
        let credentials = self.credentials.list_metadata().await?;
        let choice = answer_or_cancel!(prompt_credential_choice(
            self.prompter(),
            &credentials,
            false,
            None
        ));

        let credential_id = self.resolve_credential_choice(choice).await?;
        let changed = self
            .connections
            .assign_group_credential(&group, credential_id.as_deref())
            .await?;

        self.host.refresh();
        self.host.notify_info(&format!(
            "Updated {changed} connection(s) in group '{group}'"
        ));
        Ok(Flow::Done)
    }

    pub(super) async fn move_connections(&self, args: CommandArgs) -> CommandResult<Flow> {
        let (dragged, target) = match (args.dragged_ids.is_empty(), args.drop_target.clone()) {
            (false, Some(target)) => (args.dragged_ids.clone(), target),
            (true, Some(_)) => {
                return Err(CommandError::Failed("nothing was dragged".to_string()));
            }
            _ => {
                let connection =
                    answer_or_cancel!(self.choose_connection(&args, "Connection to move"));
                let group = answer_or_cancel!(prompt_group(
                    self.prompter(),
                    connection.group_name()
                ));
                let target = group.map_or(DropTarget::Root, DropTarget::Group);
                (vec![connection.id], target)
            }
        };

        let moved = self.connections.regroup(&dragged, &target).await?;
        if moved > 0 {
            self.host.refresh();
        }
        Ok(Flow::Done)
    }
}
