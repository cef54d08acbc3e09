//! Add-ons that can be installed next to a cluster

use kafkaflow_config::AddonSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addon {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_port: u16,
    pub machine_type: &'static str,
    pub disk_size_gb: u32,
}

pub const CATALOG: [Addon; 6] = [
    Addon {
        id: "schema-registry",
        name: "Schema Registry",
        description: "Confluent Schema Registry for schema management",
        default_port: 8081,
        machine_type: "e2-small",
        disk_size_gb: 10,
    },
    Addon {
        id: "kafka-connect",
        name: "Kafka Connect",
        description: "Distributed Kafka Connect for integrations",
        default_port: 8083,
        machine_type: "e2-medium",
        disk_size_gb: 20,
    },
    Addon {
        id: "ksqldb",
        name: "ksqlDB",
        description: "Stream processing SQL engine for Kafka",
        default_port: 8088,
        machine_type: "e2-medium",
        disk_size_gb: 20,
    },
    Addon {
        id: "kafka-ui",
        name: "Kafka UI",
        description: "Web UI for monitoring Kafka clusters",
        default_port: 8080,
        machine_type: "e2-small",
        disk_size_gb: 10,
    },
    Addon {
        id: "prometheus",
        name: "Prometheus",
        description: "Monitoring and alerting toolkit",
        default_port: 9090,
        machine_type: "e2-small",
        disk_size_gb: 20,
    },
    Addon {
        id: "grafana",
        name: "Grafana",
        description: "Analytics and monitoring platform",
        default_port: 3000,
        machine_type: "e2-small",
        disk_size_gb: 10,
    },
];

/// Schema Registry compatibility levels
pub const COMPATIBILITY_LEVELS: [&str; 4] = ["BACKWARD", "FORWARD", "FULL", "NONE"];

/// Ports below this are privileged
pub const MIN_PORT: i64 = 1024;
pub const MAX_PORT: i64 = 65535;

pub fn find(id: &str) -> Option<&'static Addon> {
    CATALOG.iter().find(|addon| addon.id == id)
}

pub fn ids() -> Vec<String> {
    CATALOG.iter().map(|addon| addon.id.to_string()).collect()
}

/// Settings for `id`: the catalog defaults, or generic sizing for an id the
/// catalog no longer lists
pub fn settings_for(id: &str) -> AddonSettings {
    match find(id) {
        Some(addon) => addon.default_settings(),
        None => AddonSettings {
            enabled: true,
            machine_type: "e2-small".to_string(),
            disk_size_gb: 10,
            port: 8080,
            plugins: None,
            compatibility: None,
        },
    }
}

/// Label shown in a selection list; ids outside the catalog are shown bare
pub fn choice_for(id: &str) -> String {
    find(id).map_or_else(|| id.to_string(), Addon::choice_label)
}

/// Add-on id from a label built by [`Addon::choice_label`]
pub fn id_from_choice(choice: &str) -> &str {
    choice.split(" - ").next().unwrap_or(choice)
}

impl Addon {
    pub fn default_settings(&self) -> AddonSettings {
        AddonSettings {
            enabled: true,
            machine_type: self.machine_type.to_string(),
            disk_size_gb: self.disk_size_gb,
            port: self.default_port,
            plugins: None,
            compatibility: None,
        }
    }

    pub fn choice_label(&self) -> String {
        format!("{} - {}", self.id, self.name)
    }
}
