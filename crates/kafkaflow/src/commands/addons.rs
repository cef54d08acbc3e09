//! Add-on management commands
//!
//! Add-ons are recorded in the target profile's `addons` section: the
//! `enabled` list names what is installed and `settings` holds per-add-on
//! sizing. The target profile is `--profile`, else the default profile,
//! else `default`.

use crate::catalog::{self, CATALOG, COMPATIBILITY_LEVELS, MAX_PORT, MIN_PORT};
use crate::command::{Command, CommandArgs, CommandOutput, ProfileAware};
use crate::display;
use crate::services::{Failure, Outcome, Services, soft_failure};
use colored::Colorize;
use kafkaflow_config::{AddonSettings, ConfigStore, Profile};
use kafkaflow_core::{CommandResult, KafkaflowError};
use kafkaflow_prompt::{Prompt, PromptSpec};
use tracing::debug;

const ID_WIDTH: usize = 18;
const DESCRIPTION_WIDTH: usize = 50;

fn target_name(store: &ConfigStore, args: &CommandArgs) -> String {
    args.profile
        .clone()
        .or_else(|| store.get_default_profile())
        .unwrap_or_else(|| "default".to_string())
}

/// Loads the profile the add-on command works on
fn load_target<C>(command: &C, args: &CommandArgs) -> Outcome<(String, Profile)>
where
    C: Command + ProfileAware,
{
    let name = target_name(command.store(), args);
    // An unreadable document surfaces once, as this command's failure
    let Some(profile) = command
        .store()
        .try_load_profile(Some(&name))?
        .filter(|profile| !profile.is_empty())
    else {
        return Err(soft_failure(format!("Profile '{}' not found", name), command.name())
            .with_help(display::hint("profiles create", "create a new profile"))
            .into());
    };
    debug!(profile = %name, command = command.name(), "Loaded add-on target");
    Ok((name, profile))
}

fn save_target<C: ProfileAware>(command: &C, profile: &Profile, name: &str) -> Outcome<()> {
    if command.save_profile(profile, Some(name)) {
        Ok(())
    } else {
        Err(Failure::reported("Failed to save profile"))
    }
}

/// Picks one of the installed add-ons, from `--addon` or a selection
fn pick_installed(
    prompt: &Prompt,
    args: &CommandArgs,
    installed: &[String],
    message: &str,
) -> Outcome<String> {
    let id = match &args.addon {
        Some(id) => id.clone(),
        None => {
            let choices: Vec<String> = installed.iter().map(|id| catalog::choice_for(id)).collect();
            let selected = prompt.select(&PromptSpec::new(message).with_choices(choices))?;
            catalog::id_from_choice(&selected).to_string()
        }
    };
    Ok(id)
}

fn not_installed(id: &str, profile: &str) -> KafkaflowError {
    KafkaflowError::validation(
        format!("Add-on '{}' is not installed in profile '{}'", id, profile),
        "addon",
    )
}

fn display_name(id: &str) -> &str {
    catalog::find(id).map_or(id, |addon| addon.name)
}

/// Asks for machine type, disk size and port, starting from `settings`
fn prompt_sizing(prompt: &Prompt, settings: &mut AddonSettings) -> Outcome<()> {
    settings.machine_type =
        prompt.text(&PromptSpec::new("Machine type").with_default(settings.machine_type.clone()))?;

    let disk = prompt.number(
        &PromptSpec::new("Disk size (GB)")
            .with_default(i64::from(settings.disk_size_gb))
            .with_bounds(Some(1), None),
    )?;
    settings.disk_size_gb = u32::try_from(disk).map_err(|_| {
        KafkaflowError::validation(format!("Disk size {} is out of range", disk), "disk_size_gb")
    })?;

    let port = prompt.number(
        &PromptSpec::new("Port")
            .with_default(i64::from(settings.port))
            .with_bounds(Some(MIN_PORT), Some(MAX_PORT)),
    )?;
    settings.port = u16::try_from(port)
        .map_err(|_| KafkaflowError::validation(format!("Port {} is out of range", port), "port"))?;
    Ok(())
}

pub struct ListAddons {
    services: Services,
}

impl ListAddons {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let (_, profile) = load_target(self, args)?;
        let installed = profile.installed_addons().to_vec();

        self.services.say(format!(
            "{} {}",
            "Add-ons for profile:".cyan().bold(),
            profile.display_name()
        ));
        self.services.say(
            format!(
                "{:<id$} {:<id$} {:<desc$} {}",
                "ID",
                "NAME",
                "DESCRIPTION",
                "STATUS",
                id = ID_WIDTH,
                desc = DESCRIPTION_WIDTH
            )
            .bold()
            .to_string(),
        );
        self.services
            .say(display::rule(ID_WIDTH * 2 + DESCRIPTION_WIDTH + 12));

        for addon in &CATALOG {
            let status = if installed.iter().any(|id| id == addon.id) {
                "INSTALLED".green().bold().to_string()
            } else {
                String::new()
            };
            self.services.say(format!(
                "{:<id$} {:<id$} {:<desc$} {}",
                addon.id.cyan(),
                addon.name.green(),
                addon.description,
                status,
                id = ID_WIDTH,
                desc = DESCRIPTION_WIDTH
            ));
        }

        if installed.is_empty() {
            self.services
                .say(display::notice("No add-ons installed for this profile."));
            self.services
                .say(display::hint("addons install", "install an add-on"));
        }

        Ok(CommandOutput::Addons {
            available: catalog::ids(),
            installed,
        })
    }
}

impl ProfileAware for ListAddons {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for ListAddons {
    fn name(&self) -> &'static str {
        "list_addons"
    }

    fn description(&self) -> &'static str {
        "List all available and installed add-ons for a profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}

pub struct InstallAddon {
    services: Services,
}

impl InstallAddon {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let prompt = &self.services.prompt;
        let (name, mut profile) = load_target(self, args)?;

        let id = match &args.addon {
            Some(id) => id.clone(),
            None => {
                let choices: Vec<String> = CATALOG
                    .iter()
                    .filter(|addon| !profile.has_addon(addon.id))
                    .map(|addon| addon.choice_label())
                    .collect();
                if choices.is_empty() {
                    return Err(soft_failure("All add-ons already installed", self.name()).into());
                }
                let selected =
                    prompt.select(&PromptSpec::new("Select an add-on to install").with_choices(choices))?;
                catalog::id_from_choice(&selected).to_string()
            }
        };

        let Some(addon) = catalog::find(&id) else {
            return Err(KafkaflowError::validation(format!("Invalid add-on ID: {}", id), "addon")
                .with_help(format!("Available add-ons: {}", catalog::ids().join(", ")))
                .into());
        };
        if profile.has_addon(addon.id) {
            return Err(soft_failure(
                format!(
                    "Add-on '{}' is already installed in profile '{}'",
                    addon.id, name
                ),
                self.name(),
            )
            .into());
        }

        self.services
            .say(format!("Installing add-on: {}", addon.name.cyan().bold()));
        let mut settings = addon.default_settings();
        let advanced = prompt.confirm(
            &PromptSpec::new("Do you want to configure advanced settings for this add-on?")
                .with_default(false),
        )?;
        if advanced {
            prompt_sizing(prompt, &mut settings)?;
        }

        profile.install_addon(addon.id, settings);
        save_target(self, &profile, &name)?;
        self.services.say(display::success(&format!(
            "Add-on '{}' installed in profile '{}'.",
            addon.id, name
        )));
        Ok(CommandOutput::Flag(true))
    }
}

impl ProfileAware for InstallAddon {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for InstallAddon {
    fn name(&self) -> &'static str {
        "install_addon"
    }

    fn description(&self) -> &'static str {
        "Install an add-on to a profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}

pub struct UninstallAddon {
    services: Services,
}

impl UninstallAddon {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let prompt = &self.services.prompt;
        let (name, mut profile) = load_target(self, args)?;

        let installed = profile.installed_addons().to_vec();
        if installed.is_empty() {
            return Err(soft_failure(
                format!("No add-ons installed in profile '{}'", name),
                self.name(),
            )
            .into());
        }

        let id = pick_installed(prompt, args, &installed, "Select an add-on to uninstall")?;
        if !profile.has_addon(&id) {
            return Err(not_installed(&id, &name).into());
        }

        if !args.force {
            let confirmed = prompt.confirm(
                &PromptSpec::new(format!(
                    "Are you sure you want to uninstall add-on '{}' from profile '{}'?",
                    display_name(&id),
                    name
                ))
                .with_default(false),
            )?;
            if !confirmed {
                return Err(soft_failure("Uninstallation cancelled by user", self.name()).into());
            }
        }

        self.services.say(format!(
            "Uninstalling add-on: {}",
            display_name(&id).cyan().bold()
        ));
        profile.uninstall_addon(&id);
        save_target(self, &profile, &name)?;
        self.services.say(display::success(&format!(
            "Add-on '{}' uninstalled from profile '{}'.",
            id, name
        )));
        Ok(CommandOutput::Flag(true))
    }
}

impl ProfileAware for UninstallAddon {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for UninstallAddon {
    fn name(&self) -> &'static str {
        "uninstall_addon"
    }

    fn description(&self) -> &'static str {
        "Uninstall an add-on from a profile"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}

pub struct ConfigureAddon {
    services: Services,
}

impl ConfigureAddon {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let prompt = &self.services.prompt;
        let (name, mut profile) = load_target(self, args)?;

        let installed = profile.installed_addons().to_vec();
        if installed.is_empty() {
            return Err(soft_failure(
                format!("No add-ons installed in profile '{}'", name),
                self.name(),
            )
            .into());
        }

        let id = pick_installed(prompt, args, &installed, "Select an add-on to configure")?;
        if !profile.has_addon(&id) {
            return Err(not_installed(&id, &name).into());
        }

        let mut settings = profile
            .addons
            .settings
            .get(&id)
            .cloned()
            .unwrap_or_else(|| catalog::settings_for(&id));
        self.show_settings(&id, &settings)?;

        self.services
            .say("Update configuration:".cyan().bold().to_string());
        settings.enabled = prompt
            .confirm(&PromptSpec::new("Enable this add-on?").with_default(settings.enabled))?;
        if settings.enabled {
            prompt_sizing(prompt, &mut settings)?;
            match id.as_str() {
                "kafka-connect" => {
                    let plugins = prompt.text(
                        &PromptSpec::new("Comma-separated list of connector plugins to install")
                            .with_default(settings.plugins.clone().unwrap_or_default()),
                    )?;
                    settings.plugins = Some(plugins);
                }
                "schema-registry" => {
                    let compatibility = prompt.select(
                        &PromptSpec::new("Schema compatibility setting")
                            .with_choices(COMPATIBILITY_LEVELS)
                            .with_default(
                                settings
                                    .compatibility
                                    .clone()
                                    .unwrap_or_else(|| COMPATIBILITY_LEVELS[0].to_string()),
                            ),
                    )?;
                    settings.compatibility = Some(compatibility);
                }
                _ => {}
            }
        }

        profile.addons.settings.insert(id.clone(), settings.clone());
        save_target(self, &profile, &name)?;
        self.services.say(display::success(&format!(
            "Configuration updated for add-on '{}'.",
            id
        )));
        Ok(CommandOutput::AddonSettings(settings))
    }

    fn show_settings(&self, id: &str, settings: &AddonSettings) -> Outcome<()> {
        let document = serde_yaml::to_value(settings)
            .map_err(|e| KafkaflowError::general(format!("Cannot display add-on settings: {}", e)))?;

        self.services.say(format!(
            "{} {}",
            "Current configuration for add-on:".cyan().bold(),
            display_name(id)
        ));
        if let Some(entries) = document.as_mapping() {
            for line in display::mapping_rows(entries) {
                self.services.say(line);
            }
        }
        Ok(())
    }
}

impl ProfileAware for ConfigureAddon {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for ConfigureAddon {
    fn name(&self) -> &'static str {
        "configure_addon"
    }

    fn description(&self) -> &'static str {
        "Configure settings for an installed add-on"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}
