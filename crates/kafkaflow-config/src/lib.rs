//! Profile and global configuration store
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/config.yaml
//! <root>/profiles/<name>.yaml
//! <root>/terraform/
//! ```
//!
//! Every `try_*` method returns the failure as a [`ConfigError`]. The plain
//! methods report failures through the shared [`ErrorHandler`] and return a
//! neutral value instead (`None`, `false`, an empty list).

pub mod document;
pub mod error;

pub use document::*;
pub use error::*;

use kafkaflow_core::{ErrorHandler, KafkaflowError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

const APP_DIR: &str = "kafkaflow";
const CONFIG_FILE: &str = "config.yaml";
const PROFILES_DIR: &str = "profiles";
const STATE_DIR: &str = "terraform";
const PROFILE_EXTENSION: &str = "yaml";

/// Per-user root: `<config dir>/kafkaflow`
pub fn default_root() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join(APP_DIR))
}

/// Profile names become file names, so they may not escape the profiles directory
pub fn validate_profile_name(name: &str) -> Result<()> {
    if name.trim().is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidProfileName(name.to_string()));
    }
    Ok(())
}

pub struct ConfigStore {
    root: PathBuf,
    handler: Rc<ErrorHandler>,
    config: RefCell<Option<GlobalConfig>>,
    // Defaults served in place of an unreadable config.yaml. Never persisted.
    fallback: RefCell<Option<GlobalConfig>>,
}

impl ConfigStore {
    pub fn new(root: impl Into<PathBuf>, handler: Rc<ErrorHandler>) -> Self {
        Self {
            root: root.into(),
            handler,
            config: RefCell::new(None),
            fallback: RefCell::new(None),
        }
    }

    pub fn handler(&self) -> &Rc<ErrorHandler> {
        &self.handler
    }

    pub fn config_dir(&self) -> &Path {
        &self.root
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join(PROFILES_DIR)
    }

    /// Working directory handed to the provisioning tool
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn profile_path(&self, name: &str) -> PathBuf {
        self.profiles_dir()
            .join(format!("{}.{}", name, PROFILE_EXTENSION))
    }

    /// Creates the directory tree and writes a default `config.yaml` if missing
    pub fn ensure_initialized(&self) -> Result<()> {
        for dir in [self.root.clone(), self.profiles_dir(), self.state_dir()] {
            fs::create_dir_all(&dir).map_err(|source| ConfigError::Init {
                path: dir.clone(),
                source,
            })?;
        }

        let path = self.config_path();
        if !path.exists() {
            write_yaml(&path, &GlobalConfig::default())?;
            info!(path = %path.display(), "Created default configuration");
        }
        Ok(())
    }

    pub fn try_get_config(&self) -> Result<GlobalConfig> {
        if let Some(config) = self.config.borrow().as_ref() {
            return Ok(config.clone());
        }

        self.ensure_initialized()?;
        let config: GlobalConfig = read_yaml(&self.config_path())?.unwrap_or_default();
        debug!(path = %self.config_path().display(), "Loaded configuration");
        *self.config.borrow_mut() = Some(config.clone());
        Ok(config)
    }

    /// Current global configuration. An unreadable document is reported
    /// once and read as the defaults for the rest of the process. Updates
    /// keep failing until the file is repaired, so it is never overwritten.
    pub fn get_config(&self) -> GlobalConfig {
        if let Some(config) = self.fallback.borrow().as_ref() {
            return config.clone();
        }
        match self.try_get_config() {
            Ok(config) => config,
            Err(e) => {
                warn!("Falling back to default configuration: {}", e);
                self.report(e);
                let config = GlobalConfig::default();
                *self.fallback.borrow_mut() = Some(config.clone());
                config
            }
        }
    }

    /// True once `get_config` has substituted defaults for an unreadable file
    pub fn is_degraded(&self) -> bool {
        self.fallback.borrow().is_some()
    }

    /// Shallow merge: each top-level key of `partial` replaces the stored value.
    /// Fails with the parse error when the stored document is unreadable.
    pub fn try_update_config(&self, partial: Mapping) -> Result<GlobalConfig> {
        let current = self.try_get_config()?;
        let mut merged = match serde_yaml::to_value(&current)? {
            Value::Mapping(mapping) => mapping,
            _ => Mapping::new(),
        };
        for (key, value) in partial {
            merged.insert(key, value);
        }

        let updated: GlobalConfig = serde_yaml::from_value(Value::Mapping(merged))
            .map_err(|e| ConfigError::InvalidConfig(e.to_string()))?;
        write_yaml(&self.config_path(), &updated)?;
        debug!(path = %self.config_path().display(), "Saved configuration");

        *self.config.borrow_mut() = Some(updated.clone());
        Ok(updated)
    }

    pub fn update_config(&self, partial: Mapping) -> bool {
        self.report_result(self.try_update_config(partial)).is_some()
    }

    pub fn get_default_profile(&self) -> Option<String> {
        self.get_config().default_profile
    }

    pub fn try_set_default_profile(&self, name: Option<&str>) -> Result<()> {
        if let Some(name) = name {
            validate_profile_name(name)?;
        }
        let mut partial = Mapping::new();
        partial.insert(
            Value::from("default_profile"),
            name.map(Value::from).unwrap_or(Value::Null),
        );
        self.try_update_config(partial).map(|_| ())
    }

    /// Points the default at `name`, or clears it with `None`
    pub fn set_default_profile(&self, name: Option<&str>) -> bool {
        self.report_result(self.try_set_default_profile(name)).is_some()
    }

    /// Names of the stored profiles, sorted. Does not create the store.
    pub fn try_list_profiles(&self) -> Result<Vec<String>> {
        let dir = self.profiles_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(PROFILE_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn list_profiles(&self) -> Vec<String> {
        self.report_result(self.try_list_profiles())
            .unwrap_or_default()
    }

    pub fn profile_exists(&self, name: &str) -> bool {
        validate_profile_name(name).is_ok() && self.profile_path(name).is_file()
    }

    /// `Ok(None)` when no name resolves or nothing is stored under it
    pub fn try_load_profile(&self, name: Option<&str>) -> Result<Option<Profile>> {
        let Some(name) = self.resolve(name) else {
            return Ok(None);
        };
        validate_profile_name(&name)?;

        let path = self.profile_path(&name);
        if !path.is_file() {
            return Ok(None);
        }
        let profile = read_yaml(&path)?.unwrap_or_default();
        debug!(profile = %name, "Loaded profile");
        Ok(Some(profile))
    }

    /// Loads a profile, `None` resolving to the default. Malformed documents
    /// are reported and treated like missing ones.
    pub fn load_profile(&self, name: Option<&str>) -> Option<Profile> {
        match self.try_load_profile(name) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Ignoring unreadable profile: {}", e);
                self.report(e);
                None
            }
        }
    }

    /// Full overwrite of the document stored under the resolved name
    pub fn try_save_profile(&self, profile: &Profile, name: Option<&str>) -> Result<()> {
        let name = self.resolve(name).ok_or(ConfigError::NoProfileName)?;
        validate_profile_name(&name)?;

        self.ensure_initialized()?;
        write_yaml(&self.profile_path(&name), profile)?;
        debug!(profile = %name, "Saved profile");
        Ok(())
    }

    pub fn save_profile(&self, profile: &Profile, name: Option<&str>) -> bool {
        self.report_result(self.try_save_profile(profile, name))
            .is_some()
    }

    /// `Ok(false)` when absent. Deleting the default profile clears the pointer.
    pub fn try_delete_profile(&self, name: &str) -> Result<bool> {
        validate_profile_name(name)?;

        let path = self.profile_path(name);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(profile = %name, "Deleted profile");

        if self.get_default_profile().as_deref() == Some(name) {
            self.try_set_default_profile(None)?;
        }
        Ok(true)
    }

    pub fn delete_profile(&self, name: &str) -> bool {
        self.report_result(self.try_delete_profile(name))
            .unwrap_or(false)
    }

    fn resolve(&self, name: Option<&str>) -> Option<String> {
        match name {
            Some(name) => Some(name.to_string()),
            None => self.get_default_profile(),
        }
    }

    fn report(&self, err: ConfigError) {
        self.handler.handle(&KafkaflowError::from(err));
    }

    fn report_result<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(e);
                None
            }
        }
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

/// `Ok(None)` for an empty file
fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_yaml::to_string(value)?;
    fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kafkaflow_core::Severity;
    use tempfile::TempDir;

    fn store() -> (TempDir, ConfigStore) {
        let temp_dir = tempfile::tempdir().unwrap();
        let handler = Rc::new(ErrorHandler::with_terminator(|code| {
            panic!("unexpected exit {}", code)
        }));
        let store = ConfigStore::new(temp_dir.path().join("kafkaflow"), handler);
        (temp_dir, store)
    }

    fn partial(key: &str, value: &str) -> Mapping {
        let mut mapping = Mapping::new();
        mapping.insert(Value::from(key), Value::from(value));
        mapping
    }

    #[test]
    fn test_default_root_ends_with_app_dir() {
        if let Ok(root) = default_root() {
            assert!(root.ends_with("kafkaflow"));
        }
    }

    #[test]
    fn test_first_access_writes_default_config() {
        let (_temp, store) = store();
        let config = store.get_config();

        assert_eq!(config, GlobalConfig::default());
        assert!(store.config_path().is_file());
        assert!(store.profiles_dir().is_dir());
        assert!(store.state_dir().is_dir());
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let (_temp, store) = store();
        assert!(store.list_profiles().is_empty());
        assert!(!store.config_dir().exists());
    }

    #[test]
    fn test_save_then_load_returns_same_document() {
        let (_temp, store) = store();
        let mut profile = Profile::skeleton("dev");
        profile.gcp.project_id = Some("acme-prod".to_string());

        assert!(store.save_profile(&profile, Some("dev")));
        assert_eq!(store.load_profile(Some("dev")), Some(profile));
    }

    #[test]
    fn test_list_profiles_sorted() {
        let (_temp, store) = store();
        for name in ["staging", "dev", "prod"] {
            assert!(store.save_profile(&Profile::skeleton(name), Some(name)));
        }
        fs::write(store.profiles_dir().join("notes.txt"), "x").unwrap();

        assert_eq!(store.list_profiles(), ["dev", "prod", "staging"]);
    }

    #[test]
    fn test_delete_then_load_is_absent() {
        let (_temp, store) = store();
        store.save_profile(&Profile::skeleton("dev"), Some("dev"));

        assert!(store.delete_profile("dev"));
        assert_eq!(store.load_profile(Some("dev")), None);
        assert!(!store.list_profiles().contains(&"dev".to_string()));
        assert!(!store.delete_profile("dev"));
    }

    #[test]
    fn test_deleting_default_clears_pointer() {
        let (_temp, store) = store();
        store.save_profile(&Profile::skeleton("dev"), Some("dev"));
        store.save_profile(&Profile::skeleton("prod"), Some("prod"));
        assert!(store.set_default_profile(Some("dev")));

        assert!(store.delete_profile("prod"));
        assert_eq!(store.get_default_profile().as_deref(), Some("dev"));

        assert!(store.delete_profile("dev"));
        assert_eq!(store.get_default_profile(), None);
    }

    #[test]
    fn test_update_config_is_shallow_merge() {
        let (_temp, store) = store();

        assert!(store.update_config(partial("default_profile", "x")));
        assert_eq!(store.get_default_profile().as_deref(), Some("x"));

        assert!(store.update_config(partial("other", "y")));
        assert_eq!(store.get_default_profile().as_deref(), Some("x"));
        assert_eq!(
            store.get_config().extra.get("other"),
            Some(&Value::from("y"))
        );
    }

    #[test]
    fn test_update_config_replaces_whole_section() {
        let (_temp, store) = store();
        let mut gcp = Mapping::new();
        gcp.insert(Value::from("project_id"), Value::from("acme"));
        let mut update = Mapping::new();
        update.insert(Value::from("gcp"), Value::Mapping(gcp));

        assert!(store.update_config(update));
        let config = store.get_config();
        assert_eq!(config.gcp.project_id.as_deref(), Some("acme"));
        assert_eq!(config.gcp.region, ProviderDefaults::default().region);
    }

    #[test]
    fn test_update_config_persists() {
        let (temp, store) = store();
        store.update_config(partial("default_profile", "x"));

        let reopened = ConfigStore::new(
            temp.path().join("kafkaflow"),
            Rc::clone(store.handler()),
        );
        assert_eq!(reopened.get_default_profile().as_deref(), Some("x"));
    }

    #[test]
    fn test_load_without_default_is_none() {
        let (_temp, store) = store();
        assert_eq!(store.load_profile(None), None);
        assert_eq!(store.handler().error_count(Severity::Error), 0);
    }

    #[test]
    fn test_load_resolves_default() {
        let (_temp, store) = store();
        let profile = Profile::skeleton("dev");
        store.save_profile(&profile, Some("dev"));
        store.set_default_profile(Some("dev"));

        assert_eq!(store.load_profile(None), Some(profile));
    }

    #[test]
    fn test_save_without_resolvable_name_fails() {
        let (_temp, store) = store();

        assert!(!store.save_profile(&Profile::default(), None));
        assert_eq!(store.handler().error_count(Severity::Error), 1);
        assert!(matches!(
            store.try_save_profile(&Profile::default(), None),
            Err(ConfigError::NoProfileName)
        ));
    }

    #[test]
    fn test_empty_document_loads_as_empty_profile() {
        let (_temp, store) = store();
        store.ensure_initialized().unwrap();
        fs::write(store.profile_path("blank"), "").unwrap();

        let profile = store.load_profile(Some("blank")).unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_corrupt_profile_reported_and_absent() {
        let (_temp, store) = store();
        store.ensure_initialized().unwrap();
        fs::write(store.profile_path("broken"), "profile: [unclosed").unwrap();

        assert_eq!(store.load_profile(Some("broken")), None);
        assert_eq!(store.handler().error_count(Severity::Error), 1);
        assert!(matches!(
            store.try_load_profile(Some("broken")),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let (_temp, store) = store();
        store.ensure_initialized().unwrap();
        fs::write(store.config_path(), "default_profile: [").unwrap();

        assert_eq!(store.get_config(), GlobalConfig::default());
        assert_eq!(store.get_config(), GlobalConfig::default());
        assert_eq!(store.handler().error_count(Severity::Error), 1);
        assert!(store.is_degraded());
    }

    #[test]
    fn test_corrupt_config_is_never_overwritten() {
        let (_temp, store) = store();
        store.ensure_initialized().unwrap();
        let corrupt = "default_profile: [\nmy_precious_setting: keep-me\n";
        fs::write(store.config_path(), corrupt).unwrap();

        assert_eq!(store.get_default_profile(), None);
        assert!(!store.set_default_profile(Some("dev")));
        assert!(!store.update_config(partial("other", "y")));
        assert!(matches!(
            store.try_update_config(partial("other", "y")),
            Err(ConfigError::Parse { .. })
        ));

        assert_eq!(fs::read_to_string(store.config_path()).unwrap(), corrupt);
        assert_eq!(store.handler().error_count(Severity::Error), 3);
    }

    #[test]
    fn test_invalid_profile_names_rejected() {
        for name in ["", "  ", ".hidden", "../escape", "a/b", "a\\b"] {
            assert!(validate_profile_name(name).is_err(), "{:?}", name);
        }
        assert!(validate_profile_name("prod-eu1").is_ok());

        let (_temp, store) = store();
        assert!(!store.save_profile(&Profile::skeleton("x"), Some("../x")));

        let err = KafkaflowError::from(
            store
                .try_save_profile(&Profile::skeleton("x"), Some("../x"))
                .unwrap_err(),
        );
        assert_eq!(err.field(), Some("profile_name"));
    }

    #[test]
    fn test_profile_exists() {
        let (_temp, store) = store();
        assert!(!store.profile_exists("dev"));
        store.save_profile(&Profile::skeleton("dev"), Some("dev"));
        assert!(store.profile_exists("dev"));
        assert!(!store.profile_exists("../dev"));
    }
}
