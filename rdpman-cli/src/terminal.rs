//! Terminal prompter and view host.
//!
//! Prompts are answered from command-line flags first (see [`Presets`]).
//! Anything left over is asked on the terminal when stdin is a TTY; otherwise
//! the prompt falls back to its pre-filled value or cancels the command.

use std::collections::HashMap;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use async_trait::async_trait;
use rdpman_core::commands::ViewHost;
use rdpman_core::error::{CommandError, CommandResult, StoreError};
use rdpman_core::prompt::{ConfirmPrompt, FilePrompt, PickPrompt, Prompter, TextPrompt};

/// Answers supplied up front, keyed by prompt key
#[derive(Debug, Clone, Default)]
pub struct Presets {
    answers: HashMap<&'static str, String>,
}

impl Presets {
    /// Creates an empty answer set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers the prompt with the given key
    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.answers.insert(key, value.into());
        self
    }

    /// Answers the prompt only if a value was given
    #[must_use]
    pub fn with_opt(self, key: &'static str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }
}

fn prompt_error(e: &io::Error) -> CommandError {
    CommandError::Prompt(e.to_string())
}

fn invalid_answer(e: rdpman_core::error::ValidationError) -> CommandError {
    CommandError::Store(StoreError::Validation(e))
}

/// Reads a line from stdin; `None` at end of input
fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn ask(question: &str) -> io::Result<Option<String>> {
    let mut stderr = io::stderr();
    write!(stderr, "{question}: ")?;
    stderr.flush()?;
    read_line()
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// [`Prompter`] backed by flags and the terminal
#[derive(Debug)]
pub struct TerminalPrompter {
    presets: Presets,
    interactive: bool,
}

impl TerminalPrompter {
    /// Creates a prompter; it only asks when stdin is a terminal and
    /// `no_input` is off
    #[must_use]
    pub fn new(presets: Presets, no_input: bool) -> Self {
        Self {
            presets,
            interactive: !no_input && io::stdin().is_terminal(),
        }
    }

    fn ask_text(prompt: &TextPrompt) -> io::Result<Option<String>> {
        loop {
            let question = match (&prompt.initial, prompt.password) {
                (Some(initial), false) => format!("{} [{initial}]", prompt.title),
                _ => prompt.title.clone(),
            };
            let answer = if prompt.password {
                Some(rpassword::prompt_password(format!("{question}: "))?)
            } else {
                ask(&question)?
            };
            let Some(mut answer) = answer else {
                return Ok(None);
            };
            if answer.is_empty()
                && let Some(initial) = &prompt.initial
            {
                answer.clone_from(initial);
            }
            match prompt.check(&answer) {
                Ok(()) => return Ok(Some(answer)),
                Err(e) => eprintln!("{e}"),
            }
        }
    }

    fn ask_pick(prompt: &PickPrompt) -> io::Result<Option<usize>> {
        eprintln!("{}:", prompt.title);
        for (index, item) in prompt.items.iter().enumerate() {
            let marker = if prompt.selected == Some(index) { '*' } else { ' ' };
            match &item.description {
                Some(description) => {
                    eprintln!("{marker} {:>2}) {} ({description})", index + 1, item.label);
                }
                None => eprintln!("{marker} {:>2}) {}", index + 1, item.label),
            }
        }
        loop {
            let Some(answer) = ask("Choice")? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() && prompt.selected.is_some() {
                return Ok(prompt.selected);
            }
            let by_number = answer
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=prompt.items.len()).contains(n))
                .map(|n| n - 1);
            if let Some(index) = by_number.or_else(|| prompt.find(answer)) {
                return Ok(Some(index));
            }
            eprintln!("Not a choice: {answer}");
        }
    }

    fn ask_path(prompt: &FilePrompt) -> io::Result<Option<PathBuf>> {
        let question = match &prompt.default_name {
            Some(name) => format!("{} [{name}]", prompt.title),
            None => prompt.title.clone(),
        };
        loop {
            let Some(answer) = ask(&question)? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if !answer.is_empty() {
                return Ok(Some(PathBuf::from(answer)));
            }
            if let Some(name) = &prompt.default_name {
                return Ok(Some(PathBuf::from(name)));
            }
        }
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn input_text(&self, prompt: &TextPrompt) -> CommandResult<Option<String>> {
        if let Some(answer) = self.presets.get(prompt.key) {
            prompt.check(answer).map_err(invalid_answer)?;
            return Ok(Some(answer.to_string()));
        }
        if self.interactive {
            return Self::ask_text(prompt).map_err(|e| prompt_error(&e));
        }

        match &prompt.initial {
            Some(initial) => Ok(Some(initial.clone())),
            None if prompt.allow_empty => Ok(Some(String::new())),
            None => {
                tracing::debug!(key = prompt.key, "No answer for prompt");
                Ok(None)
            }
        }
    }

    async fn pick(&self, prompt: &PickPrompt) -> CommandResult<Option<usize>> {
        if let Some(answer) = self.presets.get(prompt.key) {
            return prompt.find(answer).map(Some).ok_or_else(|| {
                CommandError::Prompt(format!("'{answer}' is not a choice for {}", prompt.title))
            });
        }
        if self.interactive {
            return Self::ask_pick(prompt).map_err(|e| prompt_error(&e));
        }
        Ok(prompt.selected)
    }

    async fn confirm(&self, prompt: &ConfirmPrompt) -> CommandResult<Option<bool>> {
        if let Some(answer) = self.presets.get(prompt.key) {
            return Ok(parse_yes_no(answer));
        }
        if !self.interactive {
            return Ok(None);
        }
        let answer = ask(&format!("{} [y/N]", prompt.message)).map_err(|e| prompt_error(&e))?;
        Ok(answer.map(|a| parse_yes_no(&a).unwrap_or(false)))
    }

    async fn open_file(&self, prompt: &FilePrompt) -> CommandResult<Option<PathBuf>> {
        if let Some(answer) = self.presets.get(prompt.key) {
            return Ok(Some(PathBuf::from(answer)));
        }
        if !self.interactive {
            return Ok(None);
        }
        Self::ask_path(prompt).map_err(|e| prompt_error(&e))
    }

    async fn save_file(&self, prompt: &FilePrompt) -> CommandResult<Option<PathBuf>> {
        self.open_file(prompt).await
    }
}

/// [`ViewHost`] that prints to the terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalHost {
    quiet: bool,
}

impl TerminalHost {
    /// Creates a host; `quiet` suppresses informational messages
    #[must_use]
    pub const fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ViewHost for TerminalHost {
    fn refresh(&self) {
        tracing::debug!("View refresh requested");
    }

    fn notify_info(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    fn notify_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn show_document(&self, title: &str, content: &str) {
        println!("{title}");
        println!("{content}");
    }
}
