//! Shared fixtures for the integration tests

mod catalog_tests;
mod command_tests;
mod migration_tests;

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rdpman_core::error::{CommandError, CommandResult};
use rdpman_core::prompt::{ConfirmPrompt, FilePrompt, PickPrompt, Prompter, TextPrompt};
use rdpman_core::{MemoryBlobStore, MemorySecretVault, StoreContext, ViewHost};
use serde_json::Value;

/// In-memory backends plus a context over them
pub struct Backends {
    pub blobs: Arc<MemoryBlobStore>,
    pub secrets: Arc<MemorySecretVault>,
    pub ctx: StoreContext,
}

impl Backends {
    pub fn empty() -> Self {
        Self::over(MemoryBlobStore::new())
    }

    /// Backends whose connection collection starts out as `connections`
    pub fn with_connections(connections: Value) -> Self {
        Self::over(MemoryBlobStore::with_value("rdpman:connection", connections))
    }

    fn over(blobs: MemoryBlobStore) -> Self {
        let blobs = Arc::new(blobs);
        let secrets = Arc::new(MemorySecretVault::new());
        let ctx = StoreContext::new(blobs.clone(), secrets.clone());
        Self {
            blobs,
            secrets,
            ctx,
        }
    }

    pub async fn stored_connections(&self) -> Value {
        self.blobs
            .snapshot("rdpman:connection")
            .await
            .unwrap_or(Value::Null)
    }
}

/// One scripted prompt answer
#[derive(Debug, Clone)]
pub enum Answer {
    Text(Option<String>),
    Pick(Option<String>),
    Confirm(Option<bool>),
    File(Option<PathBuf>),
}

impl Answer {
    pub fn text(value: &str) -> Self {
        Self::Text(Some(value.to_string()))
    }

    /// Picks the entry whose id or label matches
    pub fn pick(value: &str) -> Self {
        Self::Pick(Some(value.to_string()))
    }
}

/// Prompter that replays answers in order and fails on a mismatch
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<&'static str>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().collect()),
            asked: Mutex::new(Vec::new()),
        })
    }

    /// Prompt keys asked so far
    pub fn asked(&self) -> Vec<&'static str> {
        self.asked.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }

    fn next(&self, key: &'static str) -> CommandResult<Answer> {
        self.asked.lock().unwrap().push(key);
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CommandError::Prompt(format!("unexpected prompt '{key}'")))
    }
}

fn mismatch(key: &str, answer: &Answer) -> CommandError {
    CommandError::Prompt(format!("prompt '{key}' got {answer:?}"))
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn input_text(&self, prompt: &TextPrompt) -> CommandResult<Option<String>> {
        match self.next(prompt.key)? {
            Answer::Text(value) => Ok(value),
            other => Err(mismatch(prompt.key, &other)),
        }
    }

    async fn pick(&self, prompt: &PickPrompt) -> CommandResult<Option<usize>> {
        match self.next(prompt.key)? {
            Answer::Pick(None) => Ok(None),
            Answer::Pick(Some(value)) => prompt
                .find(&value)
                .map(Some)
                .ok_or_else(|| CommandError::Prompt(format!("no entry '{value}'"))),
            other => Err(mismatch(prompt.key, &other)),
        }
    }

    async fn confirm(&self, prompt: &ConfirmPrompt) -> CommandResult<Option<bool>> {
        match self.next(prompt.key)? {
            Answer::Confirm(value) => Ok(value),
            other => Err(mismatch(prompt.key, &other)),
        }
    }

    async fn open_file(&self, prompt: &FilePrompt) -> CommandResult<Option<PathBuf>> {
        match self.next(prompt.key)? {
            Answer::File(value) => Ok(value),
            other => Err(mismatch(prompt.key, &other)),
        }
    }

    async fn save_file(&self, prompt: &FilePrompt) -> CommandResult<Option<PathBuf>> {
        self.open_file(prompt).await
    }
}

/// View host that records everything it is asked to show
#[derive(Debug, Default)]
pub struct RecordingHost {
    refreshes: AtomicUsize,
    pub infos: Mutex<Vec<String>>,
    pub errors: Mutex<Vec<String>>,
    pub documents: Mutex<Vec<(String, String)>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }
}

impl ViewHost for RecordingHost {
    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn notify_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn show_document(&self, title: &str, content: &str) {
        self.documents
            .lock()
            .unwrap()
            .push((title.to_string(), content.to_string()));
    }
}
