//! Profile management commands

use crate::command::{Command, CommandArgs, CommandOutput, ProfileAware};
use crate::display;
use crate::services::{Failure, Outcome, Services, soft_failure};
use colored::Colorize;
use kafkaflow_config::{ConfigStore, Profile, validate_profile_name};
use kafkaflow_core::{CommandResult, KafkaflowError};
use kafkaflow_prompt::PromptSpec;
use serde_yaml::Value;

fn no_profiles(command: &str) -> KafkaflowError {
    soft_failure("No profiles available", command)
        .with_help(display::hint("profiles create", "create a new profile"))
}

fn unknown_profile(name: &str) -> KafkaflowError {
    KafkaflowError::validation(format!("Profile '{}' does not exist", name), "profile_name")
}

/// Pre-selects the current default when it still exists, else the first profile
fn preselected(store: &ConfigStore, profiles: &[String]) -> String {
    store
        .get_default_profile()
        .filter(|name| profiles.contains(name))
        .or_else(|| profiles.first().cloned())
        .unwrap_or_default()
}

pub struct ListProfiles {
    services: Services,
}

impl ListProfiles {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self) -> Outcome<CommandOutput> {
        let profiles = self.list_profiles();
        if profiles.is_empty() {
            self.services
                .say(display::notice("No configuration profiles found."));
            self.services
                .say(display::hint("profiles create", "create a new profile"));
            return Ok(CommandOutput::Names(Vec::new()));
        }

        let active = self.store().get_default_profile();
        self.services
            .say("Available Configuration Profiles".bold().to_string());
        self.services.say(
            format!("{:<width$} {}", "PROFILE", "STATUS", width = display::NAME_WIDTH)
                .bold()
                .to_string(),
        );
        self.services.say(display::rule(display::NAME_WIDTH + 7));
        for name in &profiles {
            let status = if active.as_deref() == Some(name.as_str()) {
                "ACTIVE".green().bold().to_string()
            } else {
                String::new()
            };
            self.services.say(format!(
                "{:<width$} {}",
                name.cyan(),
                status,
                width = display::NAME_WIDTH
            ));
        }
        Ok(CommandOutput::Names(profiles))
    }
}

impl ProfileAware for ListProfiles {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for ListProfiles {
    fn name(&self) -> &'static str {
        "list_profiles"
    }

    fn description(&self) -> &'static str {
        "List all available configuration profiles"
    }

    fn execute(&self, _args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run())
    }
}

pub struct CreateProfile {
    services: Services,
}

impl CreateProfile {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let prompt = &self.services.prompt;

        let name = match &args.profile {
            Some(name) => name.trim().to_string(),
            None => prompt
                .text(&PromptSpec::new("Enter a name for the new profile").with_default("default"))?
                .trim()
                .to_string(),
        };
        validate_profile_name(&name)?;

        let existing = self.list_profiles();
        if existing.contains(&name) && !args.force {
            let overwrite = prompt.confirm(
                &PromptSpec::new(format!("Profile '{}' already exists. Overwrite?", name))
                    .with_default(false),
            )?;
            if !overwrite {
                return Err(soft_failure("Profile creation cancelled by user", self.name()).into());
            }
        }

        self.services
            .say(format!("Creating new profile: {}", name.cyan().bold()));
        let mut profile = Profile::skeleton(&name);
        if !args.assume_defaults {
            self.ask_settings(&name, &mut profile)?;
        }

        if !self.save_profile(&profile, Some(&name)) {
            return Err(Failure::reported(format!("Failed to save profile '{}'", name)));
        }
        self.services
            .say(display::success(&format!("Profile '{}' created.", name)));

        let make_default = existing.is_empty()
            || (!args.assume_defaults
                && prompt.confirm(
                    &PromptSpec::new(format!("Set '{}' as the default profile?", name))
                        .with_default(true),
                )?);
        if make_default {
            self.store().try_set_default_profile(Some(&name))?;
            self.services.say(
                format!("Profile '{}' set as default.", name)
                    .green()
                    .bold()
                    .to_string(),
            );
        }

        Ok(CommandOutput::Name(name))
    }

    fn ask_settings(&self, name: &str, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;

        let cloud = prompt.select(
            &PromptSpec::new("Select cloud provider")
                .with_choices(["gcp", "aws"])
                .with_default("gcp"),
        )?;
        if cloud == "gcp" {
            let project_id =
                prompt.text(&PromptSpec::new("Enter GCP project ID").with_default(""))?;
            profile.gcp.project_id = Some(project_id);
        }
        profile.profile.cloud = Some(cloud);

        let cluster_name = prompt.text(
            &PromptSpec::new("Enter a name for your Kafka cluster")
                .with_default(format!("kafka-{}", name)),
        )?;
        profile.kafka.cluster_name = Some(cluster_name);
        Ok(())
    }
}

impl ProfileAware for CreateProfile {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for CreateProfile {
    fn name(&self) -> &'static str {
        "create_profile"
    }

    fn description(&self) -> &'static str {
        "Create a new configuration profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}

pub struct DeleteProfile {
    services: Services,
}

impl DeleteProfile {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let prompt = &self.services.prompt;

        let profiles = self.list_profiles();
        if profiles.is_empty() {
            return Err(soft_failure("No profiles available to delete", self.name()).into());
        }

        let name = match &args.profile {
            Some(name) => name.clone(),
            None => prompt.select(
                &PromptSpec::new("Select a profile to delete").with_choices(&profiles),
            )?,
        };
        if !profiles.contains(&name) {
            return Err(unknown_profile(&name).into());
        }

        if !args.force {
            let confirmed = prompt.confirm(
                &PromptSpec::new(format!(
                    "Are you sure you want to delete profile '{}'?",
                    name
                ))
                .with_default(false),
            )?;
            if !confirmed {
                return Err(soft_failure("Profile deletion cancelled by user", self.name()).into());
            }
        }

        if !self.store().try_delete_profile(&name)? {
            return Err(KafkaflowError::resource(
                format!("Failed to delete profile '{}'", name),
                Some("profile"),
                Some(&name),
            )
            .into());
        }
        self.services
            .say(display::success(&format!("Profile '{}' deleted.", name)));
        Ok(CommandOutput::Flag(true))
    }
}

impl ProfileAware for DeleteProfile {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for DeleteProfile {
    fn name(&self) -> &'static str {
        "delete_profile"
    }

    fn description(&self) -> &'static str {
        "Delete a configuration profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}

/// Points the default profile at an existing profile
pub struct UseProfile {
    services: Services,
}

impl UseProfile {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let profiles = self.list_profiles();
        if profiles.is_empty() {
            return Err(no_profiles(self.name()).into());
        }

        let name = match &args.profile {
            Some(name) => name.clone(),
            None => self.services.prompt.select(
                &PromptSpec::new("Select the profile to use by default")
                    .with_choices(&profiles)
                    .with_default(preselected(self.store(), &profiles)),
            )?,
        };
        if !profiles.contains(&name) {
            return Err(unknown_profile(&name).into());
        }

        self.store().try_set_default_profile(Some(&name))?;
        self.services.say(display::success(&format!(
            "Profile '{}' set as default.",
            name
        )));
        Ok(CommandOutput::Name(name))
    }
}

impl ProfileAware for UseProfile {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for UseProfile {
    fn name(&self) -> &'static str {
        "use_profile"
    }

    fn description(&self) -> &'static str {
        "Set the default configuration profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}

pub struct ShowProfile {
    services: Services,
}

impl ShowProfile {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let profiles = self.list_profiles();
        if profiles.is_empty() {
            return Err(no_profiles(self.name()).into());
        }

        let name = match &args.profile {
            Some(name) => name.clone(),
            None => self.services.prompt.select(
                &PromptSpec::new("Select a profile to view")
                    .with_choices(&profiles)
                    .with_default(preselected(self.store(), &profiles)),
            )?,
        };

        let Some(profile) = self
            .store()
            .try_load_profile(Some(&name))?
            .filter(|profile| !profile.is_empty())
        else {
            return Err(KafkaflowError::validation(
                format!("Failed to load profile '{}'", name),
                "profile_name",
            )
            .into());
        };

        self.services.say(display::heading(&format!("Profile: {}", name)));
        self.print_sections(&profile)?;
        Ok(CommandOutput::Profile(Box::new(profile)))
    }

    fn print_sections(&self, profile: &Profile) -> Outcome<()> {
        let document = serde_yaml::to_value(profile)
            .map_err(|e| KafkaflowError::general(format!("Cannot display profile: {}", e)))?;
        let Value::Mapping(sections) = document else {
            return Ok(());
        };
        for line in display::sections(&sections, &["addons"]) {
            self.services.say(line);
        }

        let installed = profile.installed_addons();
        if !installed.is_empty() {
            self.services.say("");
            self.services
                .say(format!("{} {}", "Add-ons:".bold(), installed.join(", ")));
        }
        Ok(())
    }
}

impl ProfileAware for ShowProfile {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for ShowProfile {
    fn name(&self) -> &'static str {
        "show_profile"
    }

    fn description(&self) -> &'static str {
        "Show details of a configuration profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}
