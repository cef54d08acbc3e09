//! Typed documents persisted by the store
//!
//! Every section and field is optional so partially filled profiles load
//! cleanly. Top-level keys this version does not know about are kept in
//! `extra` and written back untouched.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// One deployment target's configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(skip_serializing_if = "is_default")]
    pub profile: ProfileMeta,

    #[serde(skip_serializing_if = "is_default")]
    pub gcp: GcpSettings,

    #[serde(skip_serializing_if = "is_default")]
    pub kafka: KafkaSettings,

    #[serde(skip_serializing_if = "is_default")]
    pub network: NetworkSettings,

    #[serde(skip_serializing_if = "is_default")]
    pub security: SecuritySettings,

    #[serde(skip_serializing_if = "is_default")]
    pub auth: AuthSettings,

    #[serde(skip_serializing_if = "is_default")]
    pub monitoring: MonitoringSettings,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "is_default")]
    pub addons: AddonsSection,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcpSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zookeeper_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcpu_per_broker: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ram_per_broker_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zookeeper_machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_cidr: Option<String>,
    /// Client networks allowed to reach the brokers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub client_cidr_allowlist: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_public_endpoints: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_sasl: Option<bool>,
}

/// Client authentication. `tls_method` is set only for `ssl`, and
/// `cert_path` only when the certificate is uploaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ops_agent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grafana_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grafana_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grafana_api_key: Option<String>,
}

/// Installed add-ons and their per-add-on settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddonsSection {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<String, AddonSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonSettings {
    pub enabled: bool,
    pub machine_type: String,
    pub disk_size_gb: u32,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,
}

impl Profile {
    /// Document written by the create command before any prompting
    pub fn skeleton(name: &str) -> Self {
        Self {
            profile: ProfileMeta {
                name: Some(name.to_string()),
                cloud: Some("gcp".to_string()),
            },
            gcp: GcpSettings {
                project_id: Some(String::new()),
                region: Some(String::new()),
                zone: Some(String::new()),
                ..Default::default()
            },
            kafka: KafkaSettings {
                cluster_name: Some(String::new()),
                broker_count: Some(3),
                zookeeper_count: Some(3),
                machine_type: Some("e2-standard-2".to_string()),
                disk_type: Some("pd-standard".to_string()),
                disk_size_gb: Some(100),
                ..Default::default()
            },
            network: NetworkSettings {
                network_name: Some("default".to_string()),
                subnet_name: Some("default".to_string()),
                ..Default::default()
            },
            security: SecuritySettings {
                enable_public_endpoints: Some(false),
                enable_tls: Some(true),
                enable_sasl: Some(false),
            },
            ..Default::default()
        }
    }

    /// True for the document returned when nothing was stored
    pub fn is_empty(&self) -> bool {
        is_default(self)
    }

    pub fn display_name(&self) -> &str {
        self.profile.name.as_deref().unwrap_or("unknown")
    }

    pub fn installed_addons(&self) -> &[String] {
        &self.addons.enabled
    }

    pub fn has_addon(&self, id: &str) -> bool {
        self.addons.enabled.iter().any(|a| a == id)
    }

    /// Marks `id` installed with `settings`. Already installed ids are left alone.
    pub fn install_addon(&mut self, id: &str, settings: AddonSettings) -> bool {
        if self.has_addon(id) {
            return false;
        }
        self.addons.enabled.push(id.to_string());
        self.addons.settings.insert(id.to_string(), settings);
        true
    }

    pub fn uninstall_addon(&mut self, id: &str) -> bool {
        let before = self.addons.enabled.len();
        self.addons.enabled.retain(|a| a != id);
        if self.addons.enabled.len() == before {
            return false;
        }
        self.addons.settings.remove(id);
        true
    }
}

/// Process-wide settings stored in `config.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub version: String,
    pub default_profile: Option<String>,
    pub gcp: ProviderDefaults,
    pub terraform: ToolDefaults,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderDefaults {
    pub project_id: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    pub log_level: String,
    pub auto_approve: bool,
}

pub const CONFIG_VERSION: &str = "1.0.0";

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            default_profile: None,
            gcp: ProviderDefaults::default(),
            terraform: ToolDefaults::default(),
            extra: BTreeMap::new(),
        }
    }
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            project_id: None,
            region: Some("us-central1".to_string()),
            zone: Some("us-central1-a".to_string()),
        }
    }
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            auto_approve: false,
        }
    }
}
