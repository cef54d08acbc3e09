use crate::strategy::PromptKind;
use kafkaflow_core::KafkaflowError;
use thiserror::Error;

/// Exit status for a prompt that needed a terminal it did not get
pub const EXIT_TERMINAL_REQUIRED: i32 = 1;

/// Exit status for an explicit user cancellation (Ctrl+C)
pub const EXIT_CANCELLED: i32 = 130;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("This command requires an interactive terminal.")]
    TerminalRequired,

    #[error("Operation cancelled by user.")]
    Cancelled,

    #[error("Input ended before a value was entered")]
    InputClosed,

    #[error("No choices provided for {0} prompt")]
    NoChoices(PromptKind),

    #[error("Unknown prompt strategy type: {0}")]
    UnknownStrategy(String),

    #[error("Default value of a {kind} prompt must be {expected}")]
    DefaultMismatch {
        kind: PromptKind,
        expected: &'static str,
    },

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PromptError>;

impl PromptError {
    /// Status the process ends with when this error reaches the handler
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            PromptError::TerminalRequired | PromptError::InputClosed => {
                Some(EXIT_TERMINAL_REQUIRED)
            }
            PromptError::Cancelled => Some(EXIT_CANCELLED),
            _ => None,
        }
    }
}

impl From<PromptError> for KafkaflowError {
    fn from(err: PromptError) -> Self {
        let exit_code = err.exit_code();
        let mut error = KafkaflowError::command(err.to_string(), None);
        match &err {
            PromptError::TerminalRequired => {
                error = error.with_help(
                    "Run this command in a terminal where you can provide input, \
                     or pass the values as command-line options for automation.",
                );
            }
            PromptError::InputClosed => {
                error = error.with_help("Standard input was closed while waiting for an answer");
            }
            PromptError::DefaultMismatch { kind, .. } | PromptError::NoChoices(kind) => {
                error = error.with_detail("prompt", kind.as_str());
            }
            _ => {}
        }
        match exit_code {
            Some(code) => error.with_exit_code(code),
            None => error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kafkaflow_core::{ErrorKind, Severity};

    #[test]
    fn test_terminal_required_exits_with_one() {
        let error = KafkaflowError::from(PromptError::TerminalRequired);
        assert_eq!(error.kind, ErrorKind::Command);
        assert_eq!(error.severity, Severity::Error);
        assert_eq!(error.exit_code, Some(1));
        assert!(error.help_text.is_some());
    }

    #[test]
    fn test_cancelled_exits_with_130() {
        let error = KafkaflowError::from(PromptError::Cancelled);
        assert_eq!(error.message, "Operation cancelled by user.");
        assert_eq!(error.exit_code, Some(130));
    }

    #[test]
    fn test_programming_errors_do_not_exit() {
        let error = KafkaflowError::from(PromptError::NoChoices(PromptKind::Select));
        assert_eq!(error.exit_code, None);
        assert_eq!(error.detail("prompt"), Some("select"));
    }
}
