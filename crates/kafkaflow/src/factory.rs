//! Tag to command registry
//!
//! The CLI never names a command type directly: it asks the factory for a
//! tag such as `"create_profile"`. [`CommandFactory::builtin`] is the single
//! registration table.

use crate::command::Command;
use crate::commands::addons::{ConfigureAddon, InstallAddon, ListAddons, UninstallAddon};
use crate::commands::profiles::{
    CreateProfile, DeleteProfile, ListProfiles, ShowProfile, UseProfile,
};
use crate::commands::start::StartWizard;
use crate::services::Services;
use kafkaflow_core::KafkaflowError;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

pub type Constructor =
    Box<dyn Fn(&Services) -> std::result::Result<Box<dyn Command>, KafkaflowError>>;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("No command registered with type: {0}")]
    Unregistered(String),

    #[error("Failed to create command of type {tag}: {source}")]
    Construction {
        tag: String,
        #[source]
        source: KafkaflowError,
    },
}

pub type Result<T> = std::result::Result<T, FactoryError>;

impl From<FactoryError> for KafkaflowError {
    fn from(err: FactoryError) -> Self {
        let message = err.to_string();
        match err {
            FactoryError::Unregistered(tag) | FactoryError::Construction { tag, .. } => {
                KafkaflowError::command(message, Some(&tag))
            }
        }
    }
}

#[derive(Default)]
pub struct CommandFactory {
    constructors: BTreeMap<String, Constructor>,
}

fn boxed<C: Command + 'static>(command: C) -> std::result::Result<Box<dyn Command>, KafkaflowError> {
    Ok(Box::new(command))
}

impl CommandFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory with every built-in command registered
    pub fn builtin() -> Self {
        let mut factory = Self::new();
        factory
            .register("list_profiles", |s| boxed(ListProfiles::new(s)))
            .register("create_profile", |s| boxed(CreateProfile::new(s)))
            .register("delete_profile", |s| boxed(DeleteProfile::new(s)))
            .register("use_profile", |s| boxed(UseProfile::new(s)))
            .register("show_profile", |s| boxed(ShowProfile::new(s)))
            .register("start_wizard", |s| boxed(StartWizard::new(s)))
            .register("list_addons", |s| boxed(ListAddons::new(s)))
            .register("install_addon", |s| boxed(InstallAddon::new(s)))
            .register("uninstall_addon", |s| boxed(UninstallAddon::new(s)))
            .register("configure_addon", |s| boxed(ConfigureAddon::new(s)));
        factory
    }

    /// Registers `constructor` under `tag`, replacing any earlier entry
    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&Services) -> std::result::Result<Box<dyn Command>, KafkaflowError> + 'static,
    {
        self.constructors.insert(tag.into(), Box::new(constructor));
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Registered tags in sorted order
    pub fn tags(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Builds the command registered under `tag`. A constructor failure is
    /// reported through the handler before it is returned.
    pub fn create(&self, tag: &str, services: &Services) -> Result<Box<dyn Command>> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| FactoryError::Unregistered(tag.to_string()))?;

        debug!(tag, "Creating command");
        constructor(services).map_err(|source| {
            services.handler.handle(&source);
            FactoryError::Construction {
                tag: tag.to_string(),
                source,
            }
        })
    }
}

impl std::fmt::Debug for CommandFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandFactory")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandArgs, CommandOutput};
    use crate::testing::TestServices;
    use kafkaflow_core::{CommandResult, Severity};

    struct Echo(&'static str);

    impl Command for Echo {
        fn name(&self) -> &'static str {
            self.0
        }

        fn description(&self) -> &'static str {
            "Echoes its own name"
        }

        fn execute(&self, _args: &CommandArgs) -> CommandResult<CommandOutput> {
            CommandResult::ok(CommandOutput::Name(self.0.to_string()))
        }
    }

    #[test]
    fn test_builtin_tags() {
        let factory = CommandFactory::builtin();
        assert_eq!(
            factory.tags(),
            [
                "configure_addon",
                "create_profile",
                "delete_profile",
                "install_addon",
                "list_addons",
                "list_profiles",
                "show_profile",
                "start_wizard",
                "uninstall_addon",
                "use_profile",
            ]
        );
    }

    #[test]
    fn test_builtin_names_match_tags() {
        let env = TestServices::offline();
        let factory = CommandFactory::builtin();
        for tag in factory.tags() {
            let command = factory.create(tag, &env.services).unwrap();
            assert_eq!(command.name(), tag);
            assert!(!command.description().is_empty());
        }
    }

    #[test]
    fn test_constructor_alias_accepts_closures() {
        let env = TestServices::offline();
        let constructor: Constructor = Box::new(|_| boxed(Echo("boxed")));
        let command = constructor(&env.services).unwrap();
        assert_eq!(command.name(), "boxed");
    }

    #[test]
    fn test_unregistered_tag() {
        let env = TestServices::offline();
        let result = CommandFactory::new().create("nope", &env.services);
        assert!(matches!(result, Err(FactoryError::Unregistered(tag)) if tag == "nope"));
        assert_eq!(env.services.handler.error_count(Severity::Error), 0);
    }

    #[test]
    fn test_register_overwrites() {
        let env = TestServices::offline();
        let mut factory = CommandFactory::new();
        factory.register("echo", |_| boxed(Echo("first")));
        factory.register("echo", |_| boxed(Echo("second")));

        let command = factory.create("echo", &env.services).unwrap();
        assert_eq!(command.name(), "second");
        assert_eq!(factory.tags(), ["echo"]);
    }

    #[test]
    fn test_construction_failure_reported() {
        let env = TestServices::offline();
        let mut factory = CommandFactory::new();
        factory.register("broken", |_| {
            Err(KafkaflowError::configuration("missing provider credentials"))
        });

        let result = factory.create("broken", &env.services);
        let Err(FactoryError::Construction { tag, source }) = result else {
            panic!("expected construction failure");
        };
        assert_eq!(tag, "broken");
        assert_eq!(source.message, "missing provider credentials");
        assert_eq!(env.services.handler.error_count(Severity::Error), 1);
    }
}
