//! Cluster provisioning wizard
//!
//! Walks through the GCP, Kafka, network, authentication, monitoring and
//! label sections and writes the answers into a profile, which becomes the
//! default. With `--non-interactive` the same document is built from flags.
//! `--dry-run` stops after the summary.

use crate::catalog;
use crate::command::{Command, CommandArgs, CommandOutput, ProfileAware};
use crate::display;
use crate::services::{Failure, Outcome, Services, soft_failure};
use colored::Colorize;
use kafkaflow_config::{
    AuthSettings, ConfigStore, GcpSettings, MonitoringSettings, Profile, validate_profile_name,
};
use kafkaflow_core::{CommandResult, KafkaflowError};
use kafkaflow_prompt::{PathKind, PromptError, PromptSpec};
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub const KAFKA_VERSIONS: [&str; 6] = ["3.3.1", "3.4.0", "3.4.1", "3.5.0", "3.5.1", "3.6.0"];
const DEFAULT_KAFKA_VERSION: &str = "3.6.0";

pub const STORAGE_TYPES: [&str; 3] = ["pd-standard", "pd-balanced", "pd-ssd"];

/// Regions offered when no provider listing is available
pub const REGIONS: [&str; 5] = [
    "us-central1",
    "us-east1",
    "us-west1",
    "europe-west1",
    "asia-east1",
];

pub const AUTH_METHODS: [&str; 2] = ["none", "ssl"];
pub const TLS_METHODS: [&str; 2] = ["auto-generate", "upload"];

/// Predefined broker machine types as (name, vCPU, RAM in GB)
pub const MACHINE_TYPES: [(&str, u32, u32); 8] = [
    ("e2-standard-2", 2, 8),
    ("e2-standard-4", 4, 16),
    ("e2-standard-8", 8, 32),
    ("e2-standard-16", 16, 64),
    ("n2-standard-2", 2, 8),
    ("n2-standard-4", 4, 16),
    ("n2-standard-8", 8, 32),
    ("n2-standard-16", 16, 64),
];
const LARGEST_MACHINE_TYPE: &str = "n2-standard-16";

const SECRET_MASK: &str = "********";

/// Smallest machine type with at least `vcpu` cores and `ram_gb` of memory,
/// ranked by unused cores plus unused gigabytes. Requests beyond every type
/// get the largest one.
pub fn machine_for(vcpu: u32, ram_gb: u32) -> &'static str {
    MACHINE_TYPES
        .iter()
        .filter(|&&(_, cpu, ram)| cpu >= vcpu && ram >= ram_gb)
        .min_by_key(|&&(_, cpu, ram)| (cpu - vcpu) + (ram - ram_gb))
        .map_or(LARGEST_MACHINE_TYPE, |&(name, _, _)| name)
}

pub fn zones_for(region: &str) -> Vec<String> {
    ["a", "b", "c"]
        .iter()
        .map(|suffix| format!("{}-{}", region, suffix))
        .collect()
}

/// Flags of `kafkaflow start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOptions {
    /// Build the profile from these flags instead of prompting
    pub non_interactive: bool,
    /// Show the summary without writing anything
    pub dry_run: bool,
    pub save_as_profile: Option<String>,
    pub project_id: Option<String>,
    pub region: String,
    /// Defaults to `<region>-a`
    pub zone: Option<String>,
    pub network_range: String,
    pub broker_count: u32,
    pub broker_machine_type: String,
    pub zookeeper_count: u32,
    pub zookeeper_machine_type: String,
    pub enable_monitoring: bool,
    pub enable_connect: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self {
            non_interactive: false,
            dry_run: false,
            save_as_profile: None,
            project_id: None,
            region: "us-central1".to_string(),
            zone: None,
            network_range: "10.0.0.0/16".to_string(),
            broker_count: 3,
            broker_machine_type: "e2-standard-2".to_string(),
            zookeeper_count: 3,
            zookeeper_machine_type: "e2-small".to_string(),
            enable_monitoring: true,
            enable_connect: false,
        }
    }
}

pub struct StartWizard {
    services: Services,
}

impl StartWizard {
    pub fn new(services: &Services) -> Self {
        Self {
            services: services.clone(),
        }
    }

    fn run(&self, args: &CommandArgs) -> Outcome<CommandOutput> {
        let options = &args.start;
        let (name, profile) = if options.non_interactive {
            (options.save_as_profile.clone(), self.from_flags(options)?)
        } else {
            let (name, profile) = self.interview(args)?;
            (Some(name), profile)
        };

        self.services.say("");
        self.services
            .say("Configuration Summary:".bold().to_string());
        self.print_summary(&profile)?;

        if options.dry_run {
            self.services
                .say(display::notice("Dry run: no profile was written."));
            return Ok(CommandOutput::Profile(Box::new(profile)));
        }

        let Some(name) = name else {
            self.services.say(display::hint(
                "start --non-interactive --save-as-profile <NAME>",
                "keep this configuration",
            ));
            return Ok(CommandOutput::Profile(Box::new(profile)));
        };

        if !options.non_interactive {
            let save = self.services.prompt.confirm(
                &PromptSpec::new(format!("Save this configuration as profile '{}'?", name))
                    .with_default(true),
            )?;
            if !save {
                return Err(soft_failure("Wizard cancelled by user", self.name()).into());
            }
        }
        self.persist(&name, &profile)?;
        Ok(CommandOutput::Profile(Box::new(profile)))
    }

    fn from_flags(&self, options: &StartOptions) -> Outcome<Profile> {
        let Some(project_id) = options
            .project_id
            .clone()
            .filter(|id| !id.trim().is_empty())
        else {
            return Err(KafkaflowError::validation(
                "project_id is required in non-interactive mode",
                "project_id",
            )
            .with_help("Use --project-id to specify your GCP project ID")
            .into());
        };
        if let Some(name) = &options.save_as_profile {
            validate_profile_name(name)?;
        }

        let mut profile =
            Profile::skeleton(options.save_as_profile.as_deref().unwrap_or("default"));
        profile.gcp = GcpSettings {
            project_id: Some(project_id),
            region: Some(options.region.clone()),
            zone: Some(
                options
                    .zone
                    .clone()
                    .unwrap_or_else(|| format!("{}-a", options.region)),
            ),
            ..Default::default()
        };
        profile.kafka.broker_count = Some(options.broker_count);
        profile.kafka.machine_type = Some(options.broker_machine_type.clone());
        profile.kafka.zookeeper_count = Some(options.zookeeper_count);
        profile.kafka.zookeeper_machine_type = Some(options.zookeeper_machine_type.clone());
        profile.network.network_cidr = Some(options.network_range.clone());
        profile.monitoring.enabled = Some(options.enable_monitoring);
        if options.enable_connect {
            profile.install_addon("kafka-connect", catalog::settings_for("kafka-connect"));
        }
        Ok(profile)
    }

    fn interview(&self, args: &CommandArgs) -> Outcome<(String, Profile)> {
        let prompt = &self.services.prompt;
        if !prompt.is_interactive() {
            return Err(KafkaflowError::from(PromptError::TerminalRequired)
                .with_help(display::hint(
                    "start --non-interactive --project-id <ID>",
                    "build the profile from flags",
                ))
                .into());
        }

        self.services
            .say(display::heading("Kafka on GCP Deployment Wizard"));
        self.services
            .say("This wizard collects the settings of a new Kafka cluster on GCP.");

        let name = match &args.profile {
            Some(name) => name.trim().to_string(),
            None => prompt
                .text(&PromptSpec::new("Enter a name for this profile").with_default("default"))?
                .trim()
                .to_string(),
        };
        validate_profile_name(&name)?;

        let mut profile = Profile::skeleton(&name);
        self.configure_gcp(&mut profile)?;
        self.configure_kafka(&mut profile)?;
        self.configure_network(&mut profile)?;
        self.configure_auth(&mut profile)?;
        self.configure_monitoring(&mut profile)?;
        self.configure_labels(&mut profile)?;
        debug!(profile = %name, "Wizard answers collected");
        Ok((name, profile))
    }

    fn step(&self, title: &str) {
        self.services.say("");
        self.services.say(display::heading(title));
    }

    fn ask_count(&self, message: &str, min: i64, max: i64, default: i64) -> Outcome<u32> {
        let value = self.services.prompt.number(
            &PromptSpec::new(message)
                .with_bounds(Some(min), Some(max))
                .with_default(default),
        )?;
        u32::try_from(value).map_err(|_| {
            Failure::from(KafkaflowError::validation(
                format!("{} is out of range", value),
                "number",
            ))
        })
    }

    fn configure_gcp(&self, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;
        self.step("GCP Configuration");

        let project_id =
            prompt.text(&PromptSpec::new("Enter your GCP project ID").with_default(""))?;
        let region = prompt.select(
            &PromptSpec::new("Select GCP region")
                .with_choices(REGIONS)
                .with_default(REGIONS[0]),
        )?;
        let zones = zones_for(&region);
        let selected = prompt.multiselect(
            &PromptSpec::new("Select availability zones")
                .with_choices(&zones)
                .with_default(zones[..1].to_vec())
                .with_min_selections(1),
        )?;

        profile.gcp = GcpSettings {
            project_id: Some(project_id),
            region: Some(region),
            zone: selected.first().cloned(),
            zones: selected,
        };
        Ok(())
    }

    fn configure_kafka(&self, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;
        self.step("Kafka Configuration");

        let cluster_name = prompt.text(
            &PromptSpec::new("Enter a name for your Kafka cluster").with_default("kafka-cluster"),
        )?;
        let version = prompt.select(
            &PromptSpec::new("Select Kafka version")
                .with_choices(KAFKA_VERSIONS)
                .with_default(DEFAULT_KAFKA_VERSION),
        )?;
        let brokers = self.ask_count("Enter the number of Kafka brokers", 1, 20, 3)?;
        let vcpu = self.ask_count("Enter vCPU per broker", 1, 64, 4)?;
        let ram = self.ask_count("Enter RAM per broker (GB)", 2, 256, 16)?;

        let machine_type = machine_for(vcpu, ram);
        self.services.say(format!(
            "{} {}",
            "Selected machine type:".green().bold(),
            machine_type
        ));

        let disk_type = prompt.select(
            &PromptSpec::new("Select storage type")
                .with_choices(STORAGE_TYPES)
                .with_default("pd-ssd")
                .with_help("SSD provides better performance, standard is more economical."),
        )?;
        let disk_size = self.ask_count("Enter storage size (GB) per broker", 10, 65536, 100)?;

        let kafka = &mut profile.kafka;
        kafka.cluster_name = Some(cluster_name);
        kafka.version = Some(version);
        kafka.broker_count = Some(brokers);
        kafka.vcpu_per_broker = Some(vcpu);
        kafka.ram_per_broker_gb = Some(ram);
        kafka.machine_type = Some(machine_type.to_string());
        kafka.disk_type = Some(disk_type);
        kafka.disk_size_gb = Some(disk_size);
        Ok(())
    }

    fn configure_network(&self, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;
        self.step("Network Configuration");

        let network_name =
            prompt.text(&PromptSpec::new("Enter a name for the VPC network").with_default("kafka-vpc"))?;
        let network_cidr =
            prompt.text(&PromptSpec::new("Enter network CIDR block").with_default("10.0.0.0/16"))?;
        let allowlist = prompt.text(
            &PromptSpec::new("Enter client CIDR allowlist, one per line")
                .multiline()
                .with_default("0.0.0.0/0"),
        )?;

        let region = profile.gcp.region.clone().unwrap_or_default();
        let network = &mut profile.network;
        network.network_name = Some(network_name);
        network.subnet_name = Some(format!("kafka-subnet-{}", region));
        network.network_cidr = Some(network_cidr);
        network.client_cidr_allowlist = allowlist
            .lines()
            .map(str::trim)
            .filter(|cidr| !cidr.is_empty())
            .map(String::from)
            .collect();
        Ok(())
    }

    fn configure_auth(&self, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;
        self.step("Authentication Configuration");

        let method = prompt.select(
            &PromptSpec::new("Select authentication method")
                .with_choices(AUTH_METHODS)
                .with_default("none")
                .with_help(
                    "none: anyone who can reach the cluster can connect\n\
                     ssl: clients authenticate with TLS client certificates",
                ),
        )?;

        let mut auth = AuthSettings::default();
        if method == "ssl" {
            let tls_method = prompt.select(
                &PromptSpec::new("TLS certificates")
                    .with_choices(TLS_METHODS)
                    .with_default("auto-generate"),
            )?;
            if tls_method == "upload" {
                let cert_path = prompt.path(
                    &PromptSpec::new("Enter path to the TLS certificate file (.pem or .p12)")
                        .must_exist()
                        .with_path_kind(PathKind::File),
                )?;
                auth.cert_path = Some(cert_path);
            }
            auth.tls_method = Some(tls_method);
        }
        auth.method = Some(method);
        profile.auth = auth;
        Ok(())
    }

    fn configure_monitoring(&self, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;
        self.step("Monitoring Configuration");

        let enabled =
            prompt.confirm(&PromptSpec::new("Enable monitoring?").with_default(true))?;
        let mut monitoring = MonitoringSettings {
            enabled: Some(enabled),
            ..Default::default()
        };

        if enabled {
            let ops_agent =
                prompt.confirm(&PromptSpec::new("Install the Ops agent?").with_default(true))?;
            let grafana_export = prompt
                .confirm(&PromptSpec::new("Export Grafana dashboards?").with_default(false))?;
            if grafana_export {
                let host =
                    prompt.text(&PromptSpec::new("Enter Grafana host URL").with_default(""))?;
                let api_key = prompt.password(
                    &PromptSpec::new("Enter Grafana API key")
                        .with_default("")
                        .with_confirmation(),
                )?;
                monitoring.grafana_host = Some(host);
                monitoring.grafana_api_key = Some(api_key);
            }
            monitoring.ops_agent = Some(ops_agent);
            monitoring.grafana_export = Some(grafana_export);
        }
        profile.monitoring = monitoring;
        Ok(())
    }

    fn configure_labels(&self, profile: &mut Profile) -> Outcome<()> {
        let prompt = &self.services.prompt;
        self.step("Labels");

        let mut labels = BTreeMap::new();
        loop {
            let key = prompt.text(
                &PromptSpec::new("Enter label key (leave blank to finish)").with_default(""),
            )?;
            let key = key.trim();
            if key.is_empty() {
                break;
            }
            let value =
                prompt.text(&PromptSpec::new(format!("Enter value for {}", key)).with_default(""))?;
            labels.insert(key.to_string(), value);

            if !prompt.confirm(&PromptSpec::new("Add another label?").with_default(true))? {
                break;
            }
        }
        profile.labels = labels;
        Ok(())
    }

    /// Section tables of the document with secrets masked
    fn print_summary(&self, profile: &Profile) -> Outcome<()> {
        let mut shown = profile.clone();
        if let Some(key) = shown
            .monitoring
            .grafana_api_key
            .as_mut()
            .filter(|key| !key.is_empty())
        {
            *key = SECRET_MASK.to_string();
        }

        let document = serde_yaml::to_value(&shown)
            .map_err(|e| KafkaflowError::general(format!("Cannot display configuration: {}", e)))?;
        let Value::Mapping(sections) = document else {
            return Ok(());
        };
        for line in display::sections(&sections, &["profile"]) {
            self.services.say(line);
        }
        Ok(())
    }

    /// Writes the profile and makes it the default
    fn persist(&self, name: &str, profile: &Profile) -> Outcome<()> {
        if self.store().profile_exists(name) {
            self.services.say(display::notice(&format!(
                "Profile '{}' already exists and will be overwritten",
                name
            )));
        }
        if !self.save_profile(profile, Some(name)) {
            return Err(Failure::reported(format!("Failed to save profile '{}'", name)));
        }
        self.store().try_set_default_profile(Some(name))?;
        debug!(profile = %name, "Saved wizard profile");

        self.services.say(display::success(&format!(
            "Configuration saved as profile '{}' and set as default.",
            name
        )));
        Ok(())
    }
}

impl ProfileAware for StartWizard {
    fn store(&self) -> &ConfigStore {
        &self.services.store
    }
}

impl Command for StartWizard {
    fn name(&self) -> &'static str {
        "start_wizard"
    }

    fn description(&self) -> &'static str {
        "Interactive Kafka cluster provisioning wizard"
    }

    fn execute(&self, args: &CommandArgs) -> CommandResult<CommandOutput> {
        self.services.conclude(self.run(args))
    }
}
