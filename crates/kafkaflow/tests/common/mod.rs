use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary configuration directory for one test
pub struct TestConfig {
    pub root: TempDir,
}

impl TestConfig {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.path().join("profiles").join(format!("{}.yaml", name))
    }

    pub fn read_profile(&self, name: &str) -> String {
        fs::read_to_string(self.profile_path(name)).unwrap()
    }

    #[allow(dead_code)]
    pub fn read_config(&self) -> String {
        fs::read_to_string(self.path().join("config.yaml")).unwrap()
    }

    /// The binary pointed at this directory, never prompting
    pub fn kafkaflow(&self) -> Command {
        let mut cmd = Command::cargo_bin("kafkaflow").unwrap();
        cmd.env("KAFKAFLOW_CONFIG_DIR", self.path())
            .env("NO_COLOR", "1")
            .arg("--no-interaction");
        cmd
    }

    /// Creates `name` with default answers
    pub fn create_profile(&self, name: &str) {
        self.kafkaflow()
            .args(["profiles", "create", "--defaults", "--name", name])
            .assert()
            .success();
    }
}
