//! Console formatting shared by the commands

use colored::Colorize;
use serde_yaml::{Mapping, Value};

pub const NAME_WIDTH: usize = 24;

pub fn success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

pub fn notice(message: &str) -> String {
    message.yellow().to_string()
}

pub fn heading(title: &str) -> String {
    title.cyan().bold().to_string()
}

pub fn rule(width: usize) -> String {
    "─".repeat(width).dimmed().to_string()
}

/// Hint pointing at another subcommand
pub fn hint(command: &str, purpose: &str) -> String {
    format!("Use {} to {}.", format!("kafkaflow {}", command).bold(), purpose)
}

pub fn section_title(key: &str) -> String {
    match key {
        "profile" => "Profile Settings".to_string(),
        "gcp" => "GCP Configuration".to_string(),
        "kafka" => "Kafka Configuration".to_string(),
        "network" => "Network Configuration".to_string(),
        "security" => "Security Configuration".to_string(),
        "auth" => "Authentication Configuration".to_string(),
        "monitoring" => "Monitoring Configuration".to_string(),
        "labels" => "Labels".to_string(),
        "addons" => "Add-ons".to_string(),
        other => other.to_string(),
    }
}

/// One table cell for a document value
pub fn value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "✓".green().to_string(),
        Value::Bool(false) => "✗".red().to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(self::value).collect::<Vec<_>>().join(", "),
        Value::Mapping(_) | Value::Tagged(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().replace('\n', "; "))
            .unwrap_or_default(),
    }
}

/// `key  value` rows of a two-column table
pub fn rows<'a>(entries: impl IntoIterator<Item = (&'a str, String)>) -> Vec<String> {
    entries
        .into_iter()
        .map(|(key, value)| format!("  {:<width$} {}", key.cyan(), value, width = NAME_WIDTH))
        .collect()
}

/// Rows for the string-keyed entries of a mapping
pub fn mapping_rows(mapping: &Mapping) -> Vec<String> {
    rows(
        mapping
            .iter()
            .filter_map(|(key, entry)| key.as_str().map(|key| (key, value(entry)))),
    )
}

/// A titled table for each mapping-valued top-level key not in `skip`
pub fn sections(document: &Mapping, skip: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();
    for (key, section) in document {
        let (Some(key), Value::Mapping(entries)) = (key.as_str(), section) else {
            continue;
        };
        if skip.contains(&key) {
            continue;
        }
        lines.push(String::new());
        lines.push(section_title(key).bold().to_string());
        lines.extend(mapping_rows(entries));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_formatting() {
        colored::control::set_override(false);
        assert_eq!(value(&Value::Null), "");
        assert_eq!(value(&Value::from(true)), "✓");
        assert_eq!(value(&Value::from(false)), "✗");
        assert_eq!(value(&Value::from(3)), "3");
        assert_eq!(
            value(&Value::Sequence(vec![Value::from("a"), Value::from("b")])),
            "a, b"
        );
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(section_title("gcp"), "GCP Configuration");
        assert_eq!(section_title("monitoring"), "Monitoring Configuration");
        assert_eq!(section_title("backups"), "backups");
    }

    #[test]
    fn test_sections_skip_scalars_and_listed_keys() {
        colored::control::set_override(false);
        let document: Mapping =
            serde_yaml::from_str("version: 1\ngcp:\n  region: us-east1\naddons:\n  enabled: [grafana]\n")
                .unwrap();

        let lines = sections(&document, &["addons"]);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "GCP Configuration");
        assert!(lines[2].contains("us-east1"));
    }

    #[test]
    fn test_rows_align_keys() {
        colored::control::set_override(false);
        let lines = rows([("region", "us-central1".to_string())]);
        assert_eq!(lines[0], format!("  {:<24} us-central1", "region"));
    }
}
