//! Command abstraction
//!
//! Every invokable unit implements [`Command`] and reports its outcome as a
//! [`CommandResult`]. Failures are handled (printed, counted) at the command
//! boundary, so callers only branch on `is_ok` / `is_err`.

use crate::commands::start::StartOptions;
use kafkaflow_config::{AddonSettings, ConfigStore, Profile};
use kafkaflow_core::CommandResult;

/// Arguments shared by the built-in commands. Each command reads the
/// fields it understands and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    pub profile: Option<String>,
    pub addon: Option<String>,
    /// Skip confirmation prompts
    pub force: bool,
    /// Create without asking for optional settings
    pub assume_defaults: bool,
    /// Flags of the provisioning wizard
    pub start: StartOptions,
}

impl CommandArgs {
    pub fn for_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(profile.into()),
            ..Default::default()
        }
    }

    pub fn with_addon(mut self, addon: impl Into<String>) -> Self {
        self.addon = Some(addon.into());
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_defaults(mut self) -> Self {
        self.assume_defaults = true;
        self
    }
}

/// Value produced by a successful command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutput {
    Names(Vec<String>),
    Name(String),
    Flag(bool),
    Profile(Box<Profile>),
    Addons {
        available: Vec<String>,
        installed: Vec<String>,
    },
    AddonSettings(AddonSettings),
}

pub trait Command {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput>;
}

/// Commands that read and write profiles through the store
pub trait ProfileAware {
    fn store(&self) -> &ConfigStore;

    /// `None` resolves to the default profile. A missing profile comes back
    /// as an empty document, indistinguishable from an empty stored one.
    fn get_profile(&self, name: Option<&str>) -> Profile {
        self.store().load_profile(name).unwrap_or_default()
    }

    fn save_profile(&self, profile: &Profile, name: Option<&str>) -> bool {
        self.store().save_profile(profile, name)
    }

    fn list_profiles(&self) -> Vec<String> {
        self.store().list_profiles()
    }
}
