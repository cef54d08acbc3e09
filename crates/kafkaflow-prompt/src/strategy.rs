//! Prompt strategies
//!
//! Each strategy turns a [`PromptSpec`] into an [`Answer`]. The shared
//! contract lives in [`PromptStrategy::prompt`]: without a terminal the
//! default is returned immediately, and when there is no default the
//! prompt fails with [`PromptError::TerminalRequired`].

use crate::error::{PromptError, Result};
use crate::terminal::Terminal;
use colored::Colorize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PromptKind {
    Text,
    Select,
    MultiSelect,
    Confirm,
    Number,
    Password,
    Path,
}

impl PromptKind {
    pub const ALL: [PromptKind; 7] = [
        PromptKind::Text,
        PromptKind::Select,
        PromptKind::MultiSelect,
        PromptKind::Confirm,
        PromptKind::Number,
        PromptKind::Password,
        PromptKind::Path,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Text => "text",
            PromptKind::Select => "select",
            PromptKind::MultiSelect => "multiselect",
            PromptKind::Confirm => "confirm",
            PromptKind::Number => "number",
            PromptKind::Password => "password",
            PromptKind::Path => "path",
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptKind {
    type Err = PromptError;

    fn from_str(s: &str) -> Result<Self> {
        PromptKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PromptError::UnknownStrategy(s.to_string()))
    }
}

/// Value produced by a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
    Flag(bool),
    Number(i64),
    Path(PathBuf),
}

impl Answer {
    pub fn into_text(self) -> Option<String> {
        match self {
            Answer::Text(text) => Some(text),
            Answer::Path(path) => Some(path.to_string_lossy().into_owned()),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<String>> {
        match self {
            Answer::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_flag(self) -> Option<bool> {
        match self {
            Answer::Flag(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn into_number(self) -> Option<i64> {
        match self {
            Answer::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Answer::Path(path) => Some(path),
            Answer::Text(text) => Some(PathBuf::from(text)),
            _ => None,
        }
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Answer::Text(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Answer::Text(value.to_string())
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Answer::Flag(value)
    }
}

impl From<i64> for Answer {
    fn from(value: i64) -> Self {
        Answer::Number(value)
    }
}

impl From<Vec<String>> for Answer {
    fn from(value: Vec<String>) -> Self {
        Answer::List(value)
    }
}

impl From<PathBuf> for Answer {
    fn from(value: PathBuf) -> Self {
        Answer::Path(value)
    }
}

/// What a path prompt accepts when the path exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathKind {
    #[default]
    Any,
    File,
    Directory,
}

/// Parameters of one prompt invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptSpec {
    pub message: String,
    pub default: Option<Answer>,
    pub help_text: Option<String>,
    /// select / multiselect
    pub choices: Vec<String>,
    pub min_selections: usize,
    /// number bounds, inclusive
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub multiline: bool,
    /// password: ask twice
    pub confirm: bool,
    pub must_exist: bool,
    pub path_kind: PathKind,
}

impl PromptSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_default(mut self, default: impl Into<Answer>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_selections(mut self, min_selections: usize) -> Self {
        self.min_selections = min_selections;
        self
    }

    pub fn with_bounds(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn with_confirmation(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub fn must_exist(mut self) -> Self {
        self.must_exist = true;
        self
    }

    pub fn with_path_kind(mut self, path_kind: PathKind) -> Self {
        self.path_kind = path_kind;
        self
    }

    fn default_text(&self) -> Option<String> {
        self.default.clone().and_then(Answer::into_text)
    }
}

pub trait PromptStrategy {
    fn kind(&self) -> PromptKind;

    /// Rejects specs this strategy cannot run, before any fallback
    fn validate(&self, _spec: &PromptSpec) -> Result<()> {
        Ok(())
    }

    /// Reads from an interactive terminal until a valid answer is entered
    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer>;

    fn prompt(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        self.validate(spec)?;

        if !terminal.is_interactive() {
            debug!(kind = %self.kind(), "non-interactive prompt: {}", spec.message);
            return spec.default.clone().ok_or(PromptError::TerminalRequired);
        }

        match self.interact(terminal, spec) {
            Err(PromptError::InputClosed) => {
                spec.default.clone().ok_or(PromptError::InputClosed)
            }
            answer => answer,
        }
    }
}

fn expect_default(
    spec: &PromptSpec,
    kind: PromptKind,
    expected: &'static str,
    accepts: impl Fn(&Answer) -> bool,
) -> Result<()> {
    match &spec.default {
        Some(default) if !accepts(default) => Err(PromptError::DefaultMismatch { kind, expected }),
        _ => Ok(()),
    }
}

fn complain(terminal: &mut dyn Terminal, message: &str) {
    terminal.print(&message.red().to_string());
}

fn with_default_hint(message: &str, default: Option<&str>) -> String {
    match default {
        Some(default) if !default.is_empty() => format!("{} [{}]: ", message, default),
        _ => format!("{}: ", message),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TextStrategy;

impl PromptStrategy for TextStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::Text
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        expect_default(spec, self.kind(), "text", |d| matches!(d, Answer::Text(_)))
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec.default_text();

        if !spec.multiline {
            terminal.prompt(&with_default_hint(&spec.message, default.as_deref()))?;
            let value = terminal.read_line()?.trim().to_string();
            return Ok(match default {
                Some(default) if value.is_empty() => Answer::Text(default),
                _ => Answer::Text(value),
            });
        }

        terminal.print(&format!("{} (enter blank line to finish):", spec.message));
        let mut lines: Vec<String> = Vec::new();
        loop {
            let line = match terminal.read_line() {
                Ok(line) => line,
                Err(PromptError::InputClosed) if !lines.is_empty() => break,
                Err(e) => return Err(e),
            };
            if line.is_empty() {
                if lines.is_empty() {
                    return Ok(Answer::Text(default.unwrap_or_default()));
                }
                break;
            }
            lines.push(line);
        }
        Ok(Answer::Text(lines.join("\n")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SelectStrategy;

impl PromptStrategy for SelectStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::Select
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        if spec.choices.is_empty() {
            return Err(PromptError::NoChoices(self.kind()));
        }
        expect_default(spec, self.kind(), "text", |d| matches!(d, Answer::Text(_)))
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec.default_text().filter(|d| !d.is_empty());

        terminal.print(&spec.message);
        if let Some(help) = &spec.help_text {
            terminal.print(&help.italic().to_string());
        }
        for (i, choice) in spec.choices.iter().enumerate() {
            if default.as_deref() == Some(choice.as_str()) {
                terminal.print(&format!("  {}. {} (default)", i + 1, choice.cyan().bold()));
            } else {
                terminal.print(&format!("  {}. {}", i + 1, choice));
            }
        }

        let prompt = if default.is_some() {
            "Enter number (or press Enter for default): "
        } else {
            "Enter number: "
        };
        loop {
            terminal.prompt(prompt)?;
            let value = terminal.read_line()?.trim().to_string();

            if value.is_empty() {
                if let Some(default) = &default {
                    return Ok(Answer::Text(default.clone()));
                }
            }

            match value.parse::<usize>() {
                Ok(n) if (1..=spec.choices.len()).contains(&n) => {
                    return Ok(Answer::Text(spec.choices[n - 1].clone()));
                }
                Ok(_) => complain(terminal, "Invalid selection. Please try again."),
                Err(_) => complain(terminal, "Please enter a number."),
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MultiSelectStrategy;

impl PromptStrategy for MultiSelectStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::MultiSelect
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        if spec.choices.is_empty() {
            return Err(PromptError::NoChoices(self.kind()));
        }
        expect_default(spec, self.kind(), "a list", |d| matches!(d, Answer::List(_)))
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec
            .default
            .clone()
            .and_then(Answer::into_list)
            .unwrap_or_default();

        terminal.print(&spec.message);
        terminal.print(
            "(You can select multiple options by entering their numbers separated by spaces)",
        );
        for (i, choice) in spec.choices.iter().enumerate() {
            if default.contains(choice) {
                terminal.print(&format!(
                    "  {}. {} (selected by default)",
                    i + 1,
                    choice.cyan().bold()
                ));
            } else {
                terminal.print(&format!("  {}. {}", i + 1, choice));
            }
        }

        loop {
            terminal.prompt("Enter numbers separated by spaces (or press Enter for defaults): ")?;
            let value = terminal.read_line()?.trim().to_string();

            let selected = if value.is_empty() {
                default.clone()
            } else {
                let Ok(indices) = value
                    .split_whitespace()
                    .map(str::parse::<usize>)
                    .collect::<std::result::Result<Vec<_>, _>>()
                else {
                    complain(terminal, "Please enter numbers separated by spaces.");
                    continue;
                };

                let mut selected = Vec::new();
                for index in indices {
                    match index.checked_sub(1).and_then(|i| spec.choices.get(i)) {
                        Some(choice) => selected.push(choice.clone()),
                        None => complain(
                            terminal,
                            &format!("Invalid selection {}. Ignoring.", index),
                        ),
                    }
                }
                selected
            };

            if selected.len() < spec.min_selections {
                complain(
                    terminal,
                    &format!("You must select at least {} options.", spec.min_selections),
                );
                continue;
            }
            return Ok(Answer::List(selected));
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConfirmStrategy;

impl PromptStrategy for ConfirmStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::Confirm
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        expect_default(spec, self.kind(), "a flag", |d| matches!(d, Answer::Flag(_)))
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec.default.clone().and_then(Answer::into_flag);
        let options = match default {
            Some(true) => "[Y/n]",
            Some(false) => "[y/N]",
            None => "[y/n]",
        };
        let prompt = format!("{} {}: ", spec.message, options);

        loop {
            terminal.prompt(&prompt)?;
            let value = terminal.read_line()?.trim().to_lowercase();

            match value.as_str() {
                "" if default.is_some() => return Ok(Answer::Flag(default.unwrap_or_default())),
                "y" | "yes" => return Ok(Answer::Flag(true)),
                "n" | "no" => return Ok(Answer::Flag(false)),
                _ => complain(terminal, "Please enter 'y' or 'n'."),
            }
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NumberStrategy;

impl NumberStrategy {
    fn range_info(spec: &PromptSpec) -> String {
        match (spec.min, spec.max) {
            (Some(min), Some(max)) => format!(" ({}-{})", min, max),
            (Some(min), None) => format!(" (min: {})", min),
            (None, Some(max)) => format!(" (max: {})", max),
            (None, None) => String::new(),
        }
    }
}

impl PromptStrategy for NumberStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::Number
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        expect_default(spec, self.kind(), "a number", |d| matches!(d, Answer::Number(_)))
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec.default.clone().and_then(Answer::into_number);
        let label = format!("{}{}", spec.message, Self::range_info(spec));
        let prompt = match default {
            Some(default) => format!("{} [{}]: ", label, default),
            None => format!("{}: ", label),
        };

        loop {
            terminal.prompt(&prompt)?;
            let value = terminal.read_line()?.trim().to_string();

            if value.is_empty() {
                if let Some(default) = default {
                    return Ok(Answer::Number(default));
                }
            }

            let Ok(number) = value.parse::<i64>() else {
                complain(terminal, "Please enter a valid number.");
                continue;
            };
            if let Some(min) = spec.min.filter(|min| number < *min) {
                complain(terminal, &format!("Value must be at least {}.", min));
                continue;
            }
            if let Some(max) = spec.max.filter(|max| number > *max) {
                complain(terminal, &format!("Value must be at most {}.", max));
                continue;
            }
            return Ok(Answer::Number(number));
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PasswordStrategy;

impl PromptStrategy for PasswordStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::Password
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        expect_default(spec, self.kind(), "text", |d| matches!(d, Answer::Text(_)))
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec.default_text();

        loop {
            terminal.prompt(&format!("{}: ", spec.message))?;
            let password = terminal.read_secret()?;

            if password.is_empty() {
                if let Some(default) = default {
                    return Ok(Answer::Text(default));
                }
                return Ok(Answer::Text(password));
            }

            if spec.confirm {
                terminal.prompt("Confirm password: ")?;
                if terminal.read_secret()? != password {
                    complain(terminal, "Passwords don't match. Please try again.");
                    continue;
                }
            }
            return Ok(Answer::Text(password));
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PathStrategy;

impl PromptStrategy for PathStrategy {
    fn kind(&self) -> PromptKind {
        PromptKind::Path
    }

    fn validate(&self, spec: &PromptSpec) -> Result<()> {
        expect_default(spec, self.kind(), "a path", |d| {
            matches!(d, Answer::Path(_) | Answer::Text(_))
        })
    }

    fn interact(&self, terminal: &mut dyn Terminal, spec: &PromptSpec) -> Result<Answer> {
        let default = spec.default_text();
        let prompt = with_default_hint(&spec.message, default.as_deref());

        loop {
            terminal.prompt(&prompt)?;
            let input = terminal.read_line()?.trim().to_string();

            let value = match (&default, input.is_empty()) {
                (Some(default), true) => default.clone(),
                _ => input,
            };
            if value.is_empty() {
                complain(terminal, "Path cannot be empty.");
                continue;
            }

            let path = expand_home(&value);
            if let Err(problem) = check_path(&path, spec) {
                complain(terminal, &format!("{}: {}", problem, value));
                continue;
            }
            return Ok(Answer::Path(path));
        }
    }
}

/// Expands a leading `~` to the home directory
pub fn expand_home(value: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (value, home) {
        ("~", Some(home)) => home,
        (v, Some(home)) if v.starts_with("~/") => home.join(&v[2..]),
        (v, _) => PathBuf::from(v),
    }
}

fn check_path(path: &Path, spec: &PromptSpec) -> std::result::Result<(), &'static str> {
    if !path.exists() {
        return if spec.must_exist {
            Err("Path does not exist")
        } else {
            Ok(())
        };
    }
    match spec.path_kind {
        PathKind::Directory if path.is_file() => Err("Expected a directory, got a file"),
        PathKind::File if path.is_dir() => Err("Expected a file, got a directory"),
        _ => Ok(()),
    }
}
