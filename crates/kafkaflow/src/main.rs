use clap::{Args, Parser, Subcommand};
use kafkaflow::{CommandArgs, CommandFactory, Services, StartOptions};
use kafkaflow_prompt::{EXIT_CANCELLED, PromptError};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "kafkaflow")]
#[command(about = "Interactive assistant for Kafka cluster deployment profiles", long_about = None)]
struct Cli {
    /// Configuration directory (defaults to the per-user config directory)
    #[arg(long, global = true, env = "KAFKAFLOW_CONFIG_DIR", value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Never prompt; every question takes its default answer
    #[arg(long, global = true)]
    no_interaction: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage configuration profiles
    #[command(subcommand)]
    Profiles(ProfileCommands),
    /// Manage cluster add-ons
    #[command(subcommand)]
    Addons(AddonCommands),
    /// Start the Kafka cluster provisioning wizard
    Start(StartFlags),
    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// List all available configuration profiles
    List,
    /// Create a new configuration profile
    Create {
        /// Profile name
        #[arg(short, long)]
        name: Option<String>,
        /// Overwrite an existing profile without asking
        #[arg(short, long)]
        force: bool,
        /// Skip the provider and cluster questions
        #[arg(long)]
        defaults: bool,
    },
    /// Delete a configuration profile
    Delete {
        /// Profile name
        #[arg(short, long)]
        name: Option<String>,
        /// Delete without confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Set the default configuration profile
    Use {
        /// Profile name
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Show details of a configuration profile
    Show {
        /// Profile name
        #[arg(short, long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum AddonCommands {
    /// List all available and installed add-ons for a profile
    List {
        /// Profile to list add-ons for
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Install an add-on to a profile
    Install {
        /// ID of the add-on to install
        #[arg(short, long)]
        addon: Option<String>,
        /// Profile to install the add-on to
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Uninstall an add-on from a profile
    Uninstall {
        /// ID of the add-on to uninstall
        #[arg(short, long)]
        addon: Option<String>,
        /// Profile to uninstall the add-on from
        #[arg(short, long)]
        profile: Option<String>,
        /// Uninstall without confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Configure settings for an installed add-on
    Configure {
        /// ID of the add-on to configure
        #[arg(short, long)]
        addon: Option<String>,
        /// Profile containing the add-on
        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[derive(Args)]
struct StartFlags {
    /// Name of the profile to write (asked for when omitted)
    #[arg(short, long)]
    profile: Option<String>,
    /// Preview the configuration without writing it
    #[arg(long)]
    dry_run: bool,
    /// Build the configuration from flags instead of prompting
    #[arg(short, long)]
    non_interactive: bool,
    /// GCP project ID (required with --non-interactive)
    #[arg(long)]
    project_id: Option<String>,
    /// GCP region
    #[arg(long, default_value = "us-central1")]
    region: String,
    /// GCP zone (defaults to <region>-a)
    #[arg(long)]
    zone: Option<String>,
    /// Network CIDR range
    #[arg(long, default_value = "10.0.0.0/16")]
    network_range: String,
    /// Number of Kafka brokers
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=20))]
    broker_count: u32,
    /// Machine type for brokers
    #[arg(long, default_value = "e2-standard-2")]
    broker_machine_type: String,
    /// Number of ZooKeeper nodes
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=7))]
    zookeeper_count: u32,
    /// Machine type for ZooKeeper nodes
    #[arg(long, default_value = "e2-small")]
    zookeeper_machine_type: String,
    /// Disable the monitoring stack
    #[arg(long)]
    disable_monitoring: bool,
    /// Install the Kafka Connect add-on
    #[arg(long)]
    enable_connect: bool,
    /// Save the configuration as this profile and make it the default
    #[arg(long, value_name = "NAME")]
    save_as_profile: Option<String>,
}

impl From<StartFlags> for CommandArgs {
    fn from(flags: StartFlags) -> Self {
        CommandArgs {
            profile: flags.profile,
            start: StartOptions {
                non_interactive: flags.non_interactive,
                dry_run: flags.dry_run,
                save_as_profile: flags.save_as_profile,
                project_id: flags.project_id,
                region: flags.region,
                zone: flags.zone,
                network_range: flags.network_range,
                broker_count: flags.broker_count,
                broker_machine_type: flags.broker_machine_type,
                zookeeper_count: flags.zookeeper_count,
                zookeeper_machine_type: flags.zookeeper_machine_type,
                enable_monitoring: !flags.disable_monitoring,
                enable_connect: flags.enable_connect,
            },
            ..Default::default()
        }
    }
}

/// Factory tag and arguments for a subcommand
fn dispatch(command: Commands) -> Option<(&'static str, CommandArgs)> {
    let invocation = match command {
        Commands::Version => return None,
        Commands::Start(flags) => ("start_wizard", flags.into()),
        Commands::Profiles(profiles) => match profiles {
            ProfileCommands::List => ("list_profiles", CommandArgs::default()),
            ProfileCommands::Create {
                name,
                force,
                defaults,
            } => (
                "create_profile",
                CommandArgs {
                    profile: name,
                    force,
                    assume_defaults: defaults,
                    ..Default::default()
                },
            ),
            ProfileCommands::Delete { name, force } => (
                "delete_profile",
                CommandArgs {
                    profile: name,
                    force,
                    ..Default::default()
                },
            ),
            ProfileCommands::Use { name } => (
                "use_profile",
                CommandArgs {
                    profile: name,
                    ..Default::default()
                },
            ),
            ProfileCommands::Show { name } => (
                "show_profile",
                CommandArgs {
                    profile: name,
                    ..Default::default()
                },
            ),
        },
        Commands::Addons(addons) => match addons {
            AddonCommands::List { profile } => (
                "list_addons",
                CommandArgs {
                    profile,
                    ..Default::default()
                },
            ),
            AddonCommands::Install { addon, profile } => (
                "install_addon",
                CommandArgs {
                    profile,
                    addon,
                    ..Default::default()
                },
            ),
            AddonCommands::Uninstall {
                addon,
                profile,
                force,
            } => (
                "uninstall_addon",
                CommandArgs {
                    profile,
                    addon,
                    force,
                    ..Default::default()
                },
            ),
            AddonCommands::Configure { addon, profile } => (
                "configure_addon",
                CommandArgs {
                    profile,
                    addon,
                    ..Default::default()
                },
            ),
        },
    };
    Some(invocation)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays clean
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    // A line prompt blocked in read_line cannot observe the interrupt itself
    ctrlc::set_handler(|| {
        eprintln!("\n{}", PromptError::Cancelled);
        std::process::exit(EXIT_CANCELLED);
    })?;

    let Some((tag, args)) = dispatch(cli.command) else {
        println!("kafkaflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    };

    let root = match cli.config_dir {
        Some(dir) => dir,
        None => kafkaflow_config::default_root()?,
    };
    debug!(root = %root.display(), no_interaction = cli.no_interaction, "Starting {}", tag);

    let services = Services::open(root);
    let command = CommandFactory::builtin().create(tag, &services)?;
    if command.execute(&args).is_err() {
        std::process::exit(1);
    }
    Ok(())
}
