use kafkaflow_config::{ConfigError, ConfigStore};
use kafkaflow_core::{CommandResult, ErrorHandler, KafkaflowError, Severity};
use kafkaflow_prompt::{Prompt, PromptError};
use std::path::PathBuf;
use std::rc::Rc;

/// Process-wide services, built once at start-up and handed to every command
#[derive(Debug, Clone)]
pub struct Services {
    pub handler: Rc<ErrorHandler>,
    pub store: Rc<ConfigStore>,
    pub prompt: Rc<Prompt>,
}

/// Why a command stopped early
#[derive(Debug)]
pub enum Failure {
    /// Not presented yet; the command boundary hands it to the handler
    Unhandled(KafkaflowError),
    /// Already reported where it happened
    Reported(String),
}

pub type Outcome<T> = Result<T, Failure>;

impl Failure {
    pub fn reported(message: impl Into<String>) -> Self {
        Failure::Reported(message.into())
    }
}

impl From<KafkaflowError> for Failure {
    fn from(err: KafkaflowError) -> Self {
        Failure::Unhandled(err)
    }
}

impl From<ConfigError> for Failure {
    fn from(err: ConfigError) -> Self {
        Failure::Unhandled(err.into())
    }
}

impl From<PromptError> for Failure {
    fn from(err: PromptError) -> Self {
        Failure::Unhandled(err.into())
    }
}

impl Services {
    pub fn new(handler: Rc<ErrorHandler>, store: Rc<ConfigStore>, prompt: Rc<Prompt>) -> Self {
        Self {
            handler,
            store,
            prompt,
        }
    }

    /// Console services over the store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let handler = Rc::new(ErrorHandler::new());
        let store = Rc::new(ConfigStore::new(root, Rc::clone(&handler)));
        Self::new(handler, store, Rc::new(Prompt::stdio()))
    }

    /// Prints a line on the prompt terminal
    pub fn say(&self, line: impl AsRef<str>) {
        self.prompt.say(line.as_ref());
    }

    /// Command boundary: an unhandled failure is handled here, and every
    /// failure becomes an error value
    pub fn conclude<T>(&self, outcome: Outcome<T>) -> CommandResult<T> {
        match outcome {
            Ok(value) => CommandResult::ok(value),
            Err(Failure::Unhandled(error)) => {
                self.handler.handle(&error);
                CommandResult::error(error.message)
            }
            Err(Failure::Reported(message)) => CommandResult::error(message),
        }
    }
}

/// Expected, recoverable stop such as a declined confirmation
pub fn soft_failure(message: impl Into<String>, command: &str) -> KafkaflowError {
    KafkaflowError::command(message, Some(command)).with_severity(Severity::Warning)
}
