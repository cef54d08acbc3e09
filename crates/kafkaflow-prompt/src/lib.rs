//! Interactive prompts for kafkaflow
//!
//! [`Prompt`] is the entry point commands use. It owns a [`Terminal`] and
//! runs the strategy that [`PromptFactory`] builds for each prompt kind.

pub mod error;
pub mod interactive;
pub mod strategy;
pub mod terminal;

pub use error::{EXIT_CANCELLED, EXIT_TERMINAL_REQUIRED, PromptError, Result};
pub use interactive::is_interactive;
pub use strategy::{
    Answer, ConfirmStrategy, MultiSelectStrategy, NumberStrategy, PasswordStrategy, PathKind,
    PathStrategy, PromptKind, PromptSpec, PromptStrategy, SelectStrategy, TextStrategy,
};
pub use terminal::{ScriptedTerminal, StdTerminal, Terminal};

use std::cell::RefCell;
use std::path::PathBuf;

/// Maps a prompt kind or its tag to a strategy
pub struct PromptFactory;

impl PromptFactory {
    pub fn create(kind: PromptKind) -> Box<dyn PromptStrategy> {
        match kind {
            PromptKind::Text => Box::new(TextStrategy),
            PromptKind::Select => Box::new(SelectStrategy),
            PromptKind::MultiSelect => Box::new(MultiSelectStrategy),
            PromptKind::Confirm => Box::new(ConfirmStrategy),
            PromptKind::Number => Box::new(NumberStrategy),
            PromptKind::Password => Box::new(PasswordStrategy),
            PromptKind::Path => Box::new(PathStrategy),
        }
    }

    pub fn create_strategy(tag: &str) -> Result<Box<dyn PromptStrategy>> {
        Ok(Self::create(tag.parse()?))
    }
}

pub struct Prompt {
    terminal: RefCell<Box<dyn Terminal>>,
}

impl Prompt {
    pub fn new(terminal: impl Terminal + 'static) -> Self {
        Self {
            terminal: RefCell::new(Box::new(terminal)),
        }
    }

    /// Prompts on the process console
    pub fn stdio() -> Self {
        Self::new(StdTerminal::new())
    }

    pub fn is_interactive(&self) -> bool {
        self.terminal.borrow().is_interactive()
    }

    /// Prints a line on the prompt's terminal
    pub fn say(&self, line: &str) {
        self.terminal.borrow_mut().print(line);
    }

    pub fn ask(&self, kind: PromptKind, spec: &PromptSpec) -> Result<Answer> {
        let strategy = PromptFactory::create(kind);
        let mut terminal = self.terminal.borrow_mut();
        strategy.prompt(terminal.as_mut(), spec)
    }

    pub fn text(&self, spec: &PromptSpec) -> Result<String> {
        let answer = self.ask(PromptKind::Text, spec)?;
        answer.into_text().ok_or(mismatch(PromptKind::Text, "text"))
    }

    pub fn select(&self, spec: &PromptSpec) -> Result<String> {
        let answer = self.ask(PromptKind::Select, spec)?;
        answer.into_text().ok_or(mismatch(PromptKind::Select, "text"))
    }

    pub fn multiselect(&self, spec: &PromptSpec) -> Result<Vec<String>> {
        let answer = self.ask(PromptKind::MultiSelect, spec)?;
        answer
            .into_list()
            .ok_or(mismatch(PromptKind::MultiSelect, "a list"))
    }

    pub fn confirm(&self, spec: &PromptSpec) -> Result<bool> {
        let answer = self.ask(PromptKind::Confirm, spec)?;
        answer.into_flag().ok_or(mismatch(PromptKind::Confirm, "a flag"))
    }

    pub fn number(&self, spec: &PromptSpec) -> Result<i64> {
        let answer = self.ask(PromptKind::Number, spec)?;
        answer
            .into_number()
            .ok_or(mismatch(PromptKind::Number, "a number"))
    }

    pub fn password(&self, spec: &PromptSpec) -> Result<String> {
        let answer = self.ask(PromptKind::Password, spec)?;
        answer
            .into_text()
            .ok_or(mismatch(PromptKind::Password, "text"))
    }

    pub fn path(&self, spec: &PromptSpec) -> Result<PathBuf> {
        let answer = self.ask(PromptKind::Path, spec)?;
        answer.into_path().ok_or(mismatch(PromptKind::Path, "a path"))
    }
}

impl std::fmt::Debug for Prompt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prompt")
            .field("interactive", &self.is_interactive())
            .finish()
    }
}

fn mismatch(kind: PromptKind, expected: &'static str) -> PromptError {
    PromptError::DefaultMismatch { kind, expected }
}
