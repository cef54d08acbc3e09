use kafkaflow_core::KafkaflowError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration directory could not be determined")]
    ConfigDirNotFound,

    #[error("Failed to initialize configuration directory {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No profile name provided and no default profile set")]
    NoProfileName,

    #[error("Invalid profile name '{0}'")]
    InvalidProfileName(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for KafkaflowError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        match err {
            ConfigError::ConfigDirNotFound => KafkaflowError::configuration(message)
                .with_help("Pass --config-dir or set KAFKAFLOW_CONFIG_DIR"),
            ConfigError::Init { .. } => {
                KafkaflowError::configuration(message).with_help("Please check directory permissions")
            }
            ConfigError::Parse { path, .. } => KafkaflowError::configuration(message)
                .with_help(format!("The file at {} may be corrupted", path.display())),
            ConfigError::NoProfileName => KafkaflowError::configuration(message)
                .with_help("Specify a profile name or set a default profile first"),
            ConfigError::InvalidProfileName(_) => KafkaflowError::validation(message, "profile_name")
                .with_help("Profile names may not be empty, start with '.' or contain path separators"),
            ConfigError::Write { .. }
            | ConfigError::InvalidConfig(_)
            | ConfigError::Io(_)
            | ConfigError::Yaml(_) => KafkaflowError::configuration(message),
        }
    }
}
