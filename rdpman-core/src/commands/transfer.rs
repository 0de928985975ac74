//! Import and export commands

use crate::error::CommandResult;
use crate::prompt::{export_file_prompt, import_file_prompt};
use crate::transfer;

use super::{Commands, Flow, answer_or_cancel};

impl Commands {
    pub(super) async fn import_connections(&self) -> CommandResult<Flow> {
        let path = answer_or_cancel!(self.prompter().open_file(&import_file_prompt()));
        let entries = transfer::read_file(&path)?;
        let summary = self.connections.import(&entries).await?;

        tracing::info!(path = %path.display(), imported = summary.imported, "Imported connection list");
        if summary.imported > 0 {
            self.host.refresh();
        }
        self.host.notify_info(&format!(
            "Imported {} connection(s), skipped {}",
            summary.imported, summary.skipped
        ));
        Ok(Flow::Done)
    }

    pub(super) async fn export_connections(&self) -> CommandResult<Flow> {
        let path = answer_or_cancel!(self.prompter().save_file(&export_file_prompt()));
        let connections = self.connections.get_all().await?;
        let entries = transfer::to_entries(&connections);
        transfer::write_file(&path, &entries)?;

        tracing::info!(path = %path.display(), count = entries.len(), "Exported connection list");
        self.host.notify_info(&format!(
            "Exported {} connection(s) to {}",
            entries.len(),
            path.display()
        ));
        Ok(Flow::Done)
    }
}
