//! Uniform result value returned by every command

use crate::error::KafkaflowError;
use std::fmt;

/// Outcome of a command: a value (possibly none) or an error message.
///
/// Unlike `std::result::Result`, a successful outcome may carry no value and
/// a failure carries only a message; the failure itself has already been
/// reported through the [`crate::ErrorHandler`] when the command returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult<T> {
    Ok(Option<T>),
    Err(String),
}

const UNKNOWN_ERROR: &str = "Unknown error";

impl<T> CommandResult<T> {
    pub fn ok(value: T) -> Self {
        CommandResult::Ok(Some(value))
    }

    /// Success without a value
    pub fn done() -> Self {
        CommandResult::Ok(None)
    }

    /// Failure; an empty message is replaced so errors are never blank
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            CommandResult::Err(UNKNOWN_ERROR.to_string())
        } else {
            CommandResult::Err(message)
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CommandResult::Ok(_))
    }

    pub fn is_err(&self) -> bool {
        matches!(self, CommandResult::Err(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            CommandResult::Ok(value) => value.as_ref(),
            CommandResult::Err(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            CommandResult::Ok(_) => None,
            CommandResult::Err(message) => Some(message),
        }
    }

    /// Extracts the value; an error or an empty success becomes a Command error
    pub fn unwrap(self) -> Result<T, KafkaflowError> {
        match self {
            CommandResult::Ok(Some(value)) => Ok(value),
            CommandResult::Ok(None) => Err(KafkaflowError::command("Result value is None", None)),
            CommandResult::Err(message) => Err(KafkaflowError::command(message, None)),
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            CommandResult::Ok(Some(value)) => value,
            _ => default,
        }
    }

    /// Transforms the value. `f` must not fail: a panic inside it unwinds
    /// through the caller. Fallible transforms belong in [`try_map`](Self::try_map).
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CommandResult<U> {
        match self {
            CommandResult::Ok(Some(value)) => CommandResult::Ok(Some(f(value))),
            CommandResult::Ok(None) => CommandResult::Ok(None),
            CommandResult::Err(message) => CommandResult::Err(message),
        }
    }

    /// Like [`map`](Self::map) for fallible transforms: a failure of `f`
    /// becomes `Err(e.to_string())` instead of propagating.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> CommandResult<U>
    where
        E: fmt::Display,
    {
        match self {
            CommandResult::Ok(Some(value)) => match f(value) {
                Ok(mapped) => CommandResult::Ok(Some(mapped)),
                Err(e) => CommandResult::error(e.to_string()),
            },
            CommandResult::Ok(None) => CommandResult::Ok(None),
            CommandResult::Err(message) => CommandResult::Err(message),
        }
    }

    /// Runs `callback` when a value is present
    pub fn on_success(self, callback: impl FnOnce(&T)) -> Self {
        if let CommandResult::Ok(Some(value)) = &self {
            callback(value);
        }
        self
    }

    pub fn on_error(self, callback: impl FnOnce(&str)) -> Self {
        if let CommandResult::Err(message) = &self {
            callback(message);
        }
        self
    }
}

impl<T, E: fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => CommandResult::ok(value),
            Err(e) => CommandResult::error(e.to_string()),
        }
    }
}
