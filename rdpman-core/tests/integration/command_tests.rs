//! Commands driven through scripted prompts

use std::sync::Arc;

use rdpman_core::error::RegistryError;
use rdpman_core::prompt::{NEW_CREDENTIAL_ITEM, NO_CREDENTIAL_ITEM};
use rdpman_core::{
    CommandArgs, CommandId, CommandRegistry, CommandStatus, Commands, ConnectionStore,
    CredentialStore, DropTarget, RdpLauncher,
};
use tempfile::TempDir;

use super::{Answer, Backends, RecordingHost, ScriptedPrompter};

fn commands(
    backends: &Backends,
    answers: impl IntoIterator<Item = Answer>,
) -> (Commands, Arc<ScriptedPrompter>, Arc<RecordingHost>) {
    let prompter = ScriptedPrompter::new(answers);
    let host = RecordingHost::new();
    let commands = Commands::new(backends.ctx.clone(), prompter.clone(), host.clone());
    (commands, prompter, host)
}

#[tokio::test]
async fn cancelling_a_prompt_writes_nothing() {
    let backends = Backends::empty();
    let (commands, prompter, host) = commands(
        &backends,
        [
            Answer::text("srv01"),
            Answer::pick(NO_CREDENTIAL_ITEM),
            Answer::Text(None),
        ],
    );

    let status = commands.run(CommandId::CreateConnection, CommandArgs::default()).await;

    assert_eq!(status, CommandStatus::Cancelled);
    assert_eq!(prompter.asked(), vec!["hostname", "credential", "group"]);
    assert_eq!(backends.blobs.write_count(), 0);
    assert_eq!(host.refresh_count(), 0);
    assert!(host.errors().is_empty());
}

#[tokio::test]
async fn create_connection_with_a_new_credential() {
    let backends = Backends::empty();
    let (commands, prompter, host) = commands(
        &backends,
        [
            Answer::text("srv01"),
            Answer::pick(NEW_CREDENTIAL_ITEM),
            Answer::text("alice"),
            Answer::text("s3cret"),
            Answer::text("Lab"),
        ],
    );

    let status = commands.run(CommandId::CreateConnection, CommandArgs::default()).await;
    assert_eq!(status, CommandStatus::Completed);
    assert_eq!(prompter.remaining(), 0);
    assert_eq!(host.refresh_count(), 1);
    assert_eq!(host.infos(), vec!["Connection 'srv01' created".to_string()]);

    let credentials = commands.credentials().list_metadata().await.unwrap();
    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].username, "alice");

    let connections = commands.connections().get_all().await.unwrap();
    commands.connections().wait_for_migrations().await;
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].group.as_deref(), Some("Lab"));
    assert_eq!(
        connections[0].credential_id.as_deref(),
        Some(credentials[0].id.as_str())
    );
}

#[tokio::test]
async fn store_failures_are_reported_once_with_the_operation() {
    let backends = Backends::empty();
    ConnectionStore::new(backends.ctx.clone())
        .create("srv01", None, None)
        .await
        .unwrap();
    let (commands, _, host) = commands(
        &backends,
        [
            Answer::text("srv01"),
            Answer::pick(NO_CREDENTIAL_ITEM),
            Answer::text(""),
        ],
    );

    let status = commands.run(CommandId::CreateConnection, CommandArgs::default()).await;

    assert_eq!(status, CommandStatus::Failed);
    assert_eq!(
        host.errors(),
        vec![
            "Failed to create connection: A connection to 'srv01' with the same credential already exists"
                .to_string()
        ]
    );
    assert_eq!(host.refresh_count(), 0);
}

#[tokio::test]
async fn edit_preselects_and_keeps_current_values() {
    let backends = Backends::empty();
    let cred = CredentialStore::new(backends.ctx.clone())
        .create("alice", "pw")
        .await
        .unwrap();
    let id = ConnectionStore::new(backends.ctx.clone())
        .create("srv01", Some(&cred), Some("Lab"))
        .await
        .unwrap();
    let (commands, _, _) = commands(
        &backends,
        [
            Answer::text("srv02"),
            Answer::pick(&cred),
            Answer::text("Lab"),
        ],
    );

    let status = commands
        .run(CommandId::UpdateConnection, CommandArgs::target(&id))
        .await;
    assert_eq!(status, CommandStatus::Completed);

    let connection = commands.connections().get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(connection.hostname, "srv02");
    assert_eq!(connection.credential_id.as_deref(), Some(cred.as_str()));
    assert!(connection.modified_at.is_some());
}

#[tokio::test]
async fn deleting_a_credential_through_the_command_clears_references() {
    let backends = Backends::empty();
    let credentials = CredentialStore::new(backends.ctx.clone());
    let connections = ConnectionStore::new(backends.ctx.clone());
    let alice = credentials.create("alice", "pw").await.unwrap();
    let c1 = connections.create("h1", Some(&alice), None).await.unwrap();

    let (commands, _, host) = commands(&backends, [Answer::Confirm(Some(true))]);
    let status = commands
        .run(CommandId::DeleteCredential, CommandArgs::target(&alice))
        .await;

    assert_eq!(status, CommandStatus::Completed);
    assert_eq!(
        host.infos(),
        vec!["Credential 'alice' deleted; 1 connection(s) updated".to_string()]
    );
    assert!(credentials.list_metadata().await.unwrap().is_empty());
    let connection = connections.get_by_id(&c1).await.unwrap().unwrap();
    assert_eq!(connection.credential_id, None);
    assert!(backends.secrets.is_empty().await);
}

#[tokio::test]
async fn declining_the_confirmation_keeps_the_connection() {
    let backends = Backends::empty();
    let id = ConnectionStore::new(backends.ctx.clone())
        .create("srv01", None, None)
        .await
        .unwrap();
    let writes = backends.blobs.write_count();

    let (commands, _, _) = commands(&backends, [Answer::Confirm(Some(false))]);
    let status = commands
        .run(CommandId::DeleteConnection, CommandArgs::target(&id))
        .await;

    assert_eq!(status, CommandStatus::Cancelled);
    assert_eq!(backends.blobs.write_count(), writes);
}

#[tokio::test]
async fn dry_run_connect_masks_the_password() {
    let backends = Backends::empty();
    let cred = CredentialStore::new(backends.ctx.clone())
        .create("alice", "hunter2")
        .await
        .unwrap();
    let id = ConnectionStore::new(backends.ctx.clone())
        .create("srv01", Some(&cred), None)
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let (commands, prompter, host) = commands(&backends, []);
    let commands = commands.with_launcher(
        RdpLauncher::new()
            .with_dry_run(true)
            .with_temp_dir(dir.path())
            .with_platform("linux"),
    );

    let status = commands.run(CommandId::Connect, CommandArgs::target(&id)).await;
    assert_eq!(status, CommandStatus::Completed);
    assert!(prompter.asked().is_empty());

    let documents = host.documents.lock().unwrap().clone();
    assert_eq!(documents.len(), 1);
    let (title, content) = &documents[0];
    assert_eq!(title, "Launch plan for srv01");
    assert!(content.contains("full address:s:srv01"));
    assert!(content.contains("username:s:alice"));
    assert!(content.contains("cmdkey /delete:TERMSRV/srv01"));
    assert!(content.contains("cmdkey /generic:TERMSRV/srv01 /user:alice /pass:********"));
    assert!(content.contains("mstsc "));
    assert!(!content.contains("hunter2"));

    // Nothing is written in a dry run
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn launching_off_windows_is_reported() {
    let backends = Backends::empty();
    let cred = CredentialStore::new(backends.ctx.clone())
        .create("alice", "pw")
        .await
        .unwrap();
    let id = ConnectionStore::new(backends.ctx.clone())
        .create("srv01", Some(&cred), None)
        .await
        .unwrap();

    let (commands, _, host) = commands(&backends, []);
    let commands = commands.with_launcher(RdpLauncher::new().with_platform("linux"));

    let status = commands.run(CommandId::Connect, CommandArgs::target(&id)).await;
    assert_eq!(status, CommandStatus::Failed);
    let errors = host.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Failed to connect: "));
    assert!(errors[0].contains("linux"));
}

#[tokio::test]
async fn drop_arguments_move_connections_without_prompting() {
    let backends = Backends::empty();
    let store = ConnectionStore::new(backends.ctx.clone());
    let a = store.create("a", None, None).await.unwrap();
    let b = store.create("b", None, Some("Ops")).await.unwrap();

    let (commands, prompter, host) = commands(&backends, []);
    let status = commands
        .run(
            CommandId::MoveConnections,
            CommandArgs::drop(vec![a.clone()], DropTarget::Connection(b)),
        )
        .await;

    assert_eq!(status, CommandStatus::Completed);
    assert!(prompter.asked().is_empty());
    assert_eq!(host.refresh_count(), 1);
    let moved = store.get_by_id(&a).await.unwrap().unwrap();
    assert_eq!(moved.group.as_deref(), Some("Ops"));
}

#[tokio::test]
async fn registry_registers_once_and_dispatches_by_identifier() {
    let backends = Backends::empty();
    let mut registry = CommandRegistry::new();
    assert!(matches!(
        registry
            .execute("rdpman.refresh", CommandArgs::default())
            .await,
        Err(RegistryError::NotInitialized)
    ));

    let (first, _, host) = commands(&backends, []);
    let registered = registry.initialize(first).unwrap().to_vec();
    assert_eq!(registered.len(), CommandId::ALL.len());

    let (second, _, _) = commands(&backends, []);
    assert_eq!(
        registry.initialize(second).unwrap_err(),
        RegistryError::AlreadyInitialized
    );
    assert_eq!(registry.registered().len(), CommandId::ALL.len());

    let status = registry
        .execute("rdpman.refresh", CommandArgs::default())
        .await
        .unwrap();
    assert_eq!(status, CommandStatus::Completed);
    assert_eq!(host.refresh_count(), 1);

    assert!(matches!(
        registry
            .execute("rdpman.unknown", CommandArgs::default())
            .await,
        Err(RegistryError::UnknownCommand(_))
    ));
}

#[tokio::test]
async fn export_then_import_round_trips_through_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("connections.json");

    let source = Backends::empty();
    let store = ConnectionStore::new(source.ctx.clone());
    store.create("web", None, Some("Lab")).await.unwrap();
    store.create("db", None, None).await.unwrap();

    let (export, _, host) = commands(&source, [Answer::File(Some(path.clone()))]);
    assert_eq!(
        export
            .run(CommandId::ExportConnections, CommandArgs::default())
            .await,
        CommandStatus::Completed
    );
    export.connections().wait_for_migrations().await;
    assert!(host.infos()[0].starts_with("Exported 2 connection(s)"));

    let target = Backends::empty();
    let (import, _, host) = commands(&target, [Answer::File(Some(path.clone()))]);
    assert_eq!(
        import
            .run(CommandId::ImportConnections, CommandArgs::default())
            .await,
        CommandStatus::Completed
    );
    assert_eq!(
        host.infos(),
        vec!["Imported 2 connection(s), skipped 0".to_string()]
    );

    let mut hosts: Vec<_> = ConnectionStore::new(target.ctx.clone())
        .get_all()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.hostname)
        .collect();
    hosts.sort();
    assert_eq!(hosts, vec!["db".to_string(), "web".to_string()]);
}
