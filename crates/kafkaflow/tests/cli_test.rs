#![allow(deprecated)] // TODO: migrate Command::cargo_bin to the cargo_bin_cmd! macro

mod common;

use assert_cmd::Command;
use common::TestConfig;
use predicates::prelude::*;

/// Help lists both command groups
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("kafkaflow").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kafka cluster"))
        .stdout(predicate::str::contains("profiles"))
        .stdout(predicate::str::contains("addons"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("kafkaflow").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("kafkaflow"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("kafkaflow").unwrap();
    cmd.arg("invalid-command").assert().failure();
}

#[test]
fn test_addons_install_help() {
    let mut cmd = Command::cargo_bin("kafkaflow").unwrap();
    cmd.args(["addons", "install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--addon"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn test_list_profiles_empty() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args(["profiles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No configuration profiles found."));
}

/// The first profile becomes the default
#[test]
fn test_create_then_list() {
    let config = TestConfig::new();
    config.create_profile("dev");

    assert!(config.read_profile("dev").contains("broker_count: 3"));
    assert!(config.read_config().contains("default_profile: dev"));

    config
        .kafkaflow()
        .args(["profiles", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dev"))
        .stdout(predicate::str::contains("ACTIVE"));
}

#[test]
fn test_create_uses_prompt_defaults_without_terminal() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args(["profiles", "create", "--name", "staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'staging' created."));

    assert!(config.read_profile("staging").contains("cluster_name: kafka-staging"));
}

#[test]
fn test_create_existing_without_force_is_cancelled() {
    let config = TestConfig::new();
    config.create_profile("dev");

    config
        .kafkaflow()
        .args(["profiles", "create", "--defaults", "--name", "dev"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Profile creation cancelled by user"));
}

#[test]
fn test_create_rejects_path_like_name() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args(["profiles", "create", "--defaults", "--name", "../outside"])
        .assert()
        .failure();

    assert!(!config.path().join("outside.yaml").exists());
}

#[test]
fn test_use_and_show_profile() {
    let config = TestConfig::new();
    config.create_profile("dev");
    config.create_profile("prod");

    config
        .kafkaflow()
        .args(["profiles", "use", "--name", "prod"])
        .assert()
        .success();
    assert!(config.read_config().contains("default_profile: prod"));

    config
        .kafkaflow()
        .args(["profiles", "show", "--name", "dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile: dev"))
        .stdout(predicate::str::contains("Kafka Configuration"))
        .stdout(predicate::str::contains("pd-standard"));
}

#[test]
fn test_delete_requires_confirmation() {
    let config = TestConfig::new();
    config.create_profile("dev");

    config
        .kafkaflow()
        .args(["profiles", "delete", "--name", "dev"])
        .assert()
        .failure();
    assert!(config.profile_path("dev").exists());

    config
        .kafkaflow()
        .args(["profiles", "delete", "--name", "dev", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'dev' deleted."));
    assert!(!config.profile_path("dev").exists());
    assert!(config.read_config().contains("default_profile: null"));
}

#[test]
fn test_config_dir_flag() {
    let config = TestConfig::new();
    let mut cmd = Command::cargo_bin("kafkaflow").unwrap();
    cmd.env_remove("KAFKAFLOW_CONFIG_DIR")
        .arg("--config-dir")
        .arg(config.path())
        .args(["--no-interaction", "profiles", "create", "--defaults", "--name", "qa"])
        .assert()
        .success();

    assert!(config.profile_path("qa").exists());
}

#[test]
fn test_addon_lifecycle() {
    let config = TestConfig::new();
    config.create_profile("dev");

    config
        .kafkaflow()
        .args(["addons", "install", "--addon", "grafana"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Add-on 'grafana' installed in profile 'dev'.",
        ));
    assert!(config.read_profile("dev").contains("grafana"));

    config
        .kafkaflow()
        .args(["addons", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("INSTALLED"));

    config
        .kafkaflow()
        .args(["addons", "uninstall", "--addon", "grafana", "--force"])
        .assert()
        .success();
    assert!(!config.read_profile("dev").contains("grafana"));
}

#[test]
fn test_addon_install_without_profile() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args(["addons", "install", "--addon", "grafana"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Profile 'default' not found"));
}

/// A selection without a default cannot be answered without a terminal
#[test]
fn test_addon_install_needs_terminal_to_choose() {
    let config = TestConfig::new();
    config.create_profile("dev");

    config
        .kafkaflow()
        .args(["addons", "install"])
        .assert()
        .code(1);
    assert!(!config.read_profile("dev").contains("addons"));
}

#[test]
fn test_start_from_flags_saves_profile() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args([
            "start",
            "--non-interactive",
            "--project-id",
            "acme-data",
            "--region",
            "europe-west1",
            "--enable-connect",
            "--save-as-profile",
            "analytics",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration Summary:"))
        .stdout(predicate::str::contains("europe-west1-a"));

    let profile = config.read_profile("analytics");
    assert!(profile.contains("project_id: acme-data"));
    assert!(profile.contains("kafka-connect"));
    assert!(config.read_config().contains("default_profile: analytics"));
}

#[test]
fn test_start_dry_run_writes_nothing() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args([
            "start",
            "-n",
            "--dry-run",
            "--project-id",
            "acme-data",
            "--save-as-profile",
            "analytics",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));
    assert!(!config.profile_path("analytics").exists());
}

#[test]
fn test_start_from_flags_requires_project() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args(["start", "--non-interactive"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("project_id is required"));
}

#[test]
fn test_start_wizard_needs_terminal() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .arg("start")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--non-interactive"));
}

#[test]
fn test_start_rejects_broker_count_out_of_range() {
    let config = TestConfig::new();
    config
        .kafkaflow()
        .args(["start", "-n", "--project-id", "acme", "--broker-count", "0"])
        .assert()
        .failure();
}
