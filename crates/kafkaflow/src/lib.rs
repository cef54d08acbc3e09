//! kafkaflow - Kafka cluster provisioning assistant
//!
//! Profiles describe a deployment target; add-ons extend a cluster with
//! companion services. Every user-facing operation is a [`Command`] built by
//! the [`CommandFactory`] from a tag.

pub mod catalog;
pub mod command;
pub mod commands;
pub mod display;
pub mod factory;
pub mod services;

pub use command::{Command, CommandArgs, CommandOutput, ProfileAware};
pub use commands::start::StartOptions;
pub use factory::{CommandFactory, FactoryError};
pub use services::{Failure, Outcome, Services, soft_failure};

#[cfg(test)]
pub(crate) mod testing {
    use crate::services::Services;
    use kafkaflow_config::{ConfigStore, Profile};
    use kafkaflow_core::ErrorHandler;
    use kafkaflow_prompt::{Prompt, ScriptedTerminal};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Services over a temporary store and a scripted terminal
    pub struct TestServices {
        pub services: Services,
        pub terminal: ScriptedTerminal,
        /// Exit codes the handler asked for
        pub exits: Rc<RefCell<Vec<i32>>>,
        _dir: TempDir,
    }

    impl TestServices {
        /// Every prompt falls back to its default
        pub fn offline() -> Self {
            Self::build(ScriptedTerminal::non_interactive())
        }

        /// Interactive terminal answering with `inputs` in order
        pub fn scripted<I, S>(inputs: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self::build(ScriptedTerminal::interactive(inputs))
        }

        /// Stores a skeleton profile for each name
        pub fn with_profiles(self, names: &[&str]) -> Self {
            for name in names {
                assert!(
                    self.services
                        .store
                        .save_profile(&Profile::skeleton(name), Some(name))
                );
            }
            self
        }

        fn build(terminal: ScriptedTerminal) -> Self {
            let dir = TempDir::new().unwrap();
            let exits = Rc::new(RefCell::new(Vec::new()));
            let recorded = Rc::clone(&exits);
            let handler = Rc::new(ErrorHandler::with_terminator(move |code| {
                recorded.borrow_mut().push(code)
            }));
            let store = Rc::new(ConfigStore::new(dir.path(), Rc::clone(&handler)));
            let prompt = Rc::new(Prompt::new(terminal.clone()));

            Self {
                services: Services::new(handler, store, prompt),
                terminal,
                exits,
                _dir: dir,
            }
        }
    }
}
