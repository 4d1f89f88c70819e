use std::{
    fs,
    path::PathBuf,
    sync::{LazyLock, RwLock},
    time::Duration,
};

use depot_utils::{
    path::{resolve_path, xdg_config_home, xdg_data_home},
    time::parse_duration,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::error::{ConfigError, Result};

pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";
pub const DEFAULT_TIMEOUT: &str = "60s";
pub const DB_FILE_NAME: &str = "depot.db";

/// Whether new packages must be registered with an owner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// A new package needs an owner: `--owner`, or a user matching its maintainer email.
    #[default]
    Required,
    /// Packages are registered without owners.
    Disabled,
}

/// How an extracted version is compared with versions already registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionMatch {
    /// Plain string equality.
    #[default]
    Exact,
    /// Equality after normalising release segments (`1.0` matches `1.0.0`).
    Normalized,
}

/// Application's configuration
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding the SQLite database.
    /// Default: $DEPOT_ROOT/db
    pub db_path: Option<String>,

    /// Directory where distribution files are stored.
    /// Default: $DEPOT_ROOT/storage
    pub storage_path: Option<String>,

    /// Parent directory for per-label scratch directories.
    /// Default: the system temporary directory
    pub scratch_path: Option<String>,

    /// Base URL of the upstream package index.
    /// Default: https://pypi.org
    pub index_url: Option<String>,

    /// Ownership policy for new packages.
    /// Default: required
    pub ownership: Option<Ownership>,

    /// Version comparison used to detect already registered releases.
    /// Default: exact
    pub version_match: Option<VersionMatch>,

    /// User agent sent to the package index.
    pub user_agent: Option<String>,

    /// Global HTTP timeout, e.g. `30s` or `2m`.
    /// Default: 60s
    pub timeout: Option<String>,
}

pub static CONFIG: LazyLock<RwLock<Option<Config>>> = LazyLock::new(|| RwLock::new(None));

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("DEPOT_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("depot").join("config.toml"),
    })
});

pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

pub fn set_config_path(path: PathBuf) {
    let mut config_path = CONFIG_PATH
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *config_path = path;
}

pub fn init() -> Result<()> {
    let config = Config::new()?;
    let mut global_config = CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *global_config = Some(config);
    Ok(())
}

pub fn get_config() -> Config {
    let mut config_guard = CONFIG
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    config_guard
        .get_or_insert_with(Config::default_config)
        .clone()
}

fn depot_root() -> String {
    std::env::var("DEPOT_ROOT").unwrap_or_else(|_| format!("{}/depot", xdg_data_home().display()))
}

impl Config {
    pub fn default_config() -> Self {
        let depot_root = depot_root();

        Self {
            db_path: Some(format!("{depot_root}/db")),
            storage_path: Some(format!("{depot_root}/storage")),
            scratch_path: None,
            index_url: Some(DEFAULT_INDEX_URL.to_string()),
            ownership: Some(Ownership::Required),
            version_match: Some(VersionMatch::Exact),
            user_agent: Some(format!("depot/{}", env!("CARGO_PKG_VERSION"))),
            timeout: Some(DEFAULT_TIMEOUT.to_string()),
        }
    }

    /// Loads the configuration file at [`CONFIG_PATH`], falling back to defaults
    /// when the file does not exist.
    pub fn new() -> Result<Self> {
        let config_path = config_path();

        let mut config = match fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default_config(),
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset values with defaults and validates the rest.
    pub fn resolve(&mut self) -> Result<()> {
        let defaults = Self::default_config();

        self.db_path.get_or_insert_with(|| defaults.db_path.unwrap_or_default());
        self.storage_path
            .get_or_insert_with(|| defaults.storage_path.unwrap_or_default());
        self.index_url
            .get_or_insert_with(|| DEFAULT_INDEX_URL.to_string());
        self.ownership.get_or_insert(Ownership::Required);
        self.version_match.get_or_insert(VersionMatch::Exact);
        self.timeout.get_or_insert_with(|| DEFAULT_TIMEOUT.to_string());
        if self.user_agent.is_none() {
            self.user_agent = defaults.user_agent;
        }

        let index_url = self.index_url();
        match Url::parse(&index_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidIndexUrl(index_url)),
        }

        self.get_timeout()?;

        Ok(())
    }

    pub fn get_db_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("DEPOT_DB") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.db_path {
            Some(db_path) => Ok(resolve_path(db_path)?),
            None => Ok(resolve_path(&format!("{}/db", depot_root()))?),
        }
    }

    /// Path of the SQLite database file inside [`Config::get_db_path`].
    pub fn get_db_file(&self) -> Result<PathBuf> {
        Ok(self.get_db_path()?.join(DB_FILE_NAME))
    }

    pub fn get_storage_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("DEPOT_STORAGE") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.storage_path {
            Some(storage_path) => Ok(resolve_path(storage_path)?),
            None => Ok(resolve_path(&format!("{}/storage", depot_root()))?),
        }
    }

    pub fn get_scratch_path(&self) -> Result<Option<PathBuf>> {
        self.scratch_path
            .as_deref()
            .map(resolve_path)
            .transpose()
            .map_err(ConfigError::from)
    }

    pub fn index_url(&self) -> String {
        std::env::var("DEPOT_INDEX_URL")
            .ok()
            .or_else(|| self.index_url.clone())
            .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership.unwrap_or_default()
    }

    pub fn version_match(&self) -> VersionMatch {
        self.version_match.unwrap_or_default()
    }

    pub fn get_timeout(&self) -> Result<Duration> {
        let value = self.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT);
        parse_duration(value).ok_or_else(|| ConfigError::InvalidDuration(value.to_string()))
    }
}

pub fn generate_default_config() -> Result<()> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let def_config = Config::default_config();
    let serialized = toml::to_string_pretty(&def_config)?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&config_path, serialized)?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;
    use crate::test_utils::EnvGuard;

    #[test]
    #[serial]
    fn test_default_config() {
        let _env = EnvGuard::set(&[("DEPOT_ROOT", "/srv/depot")]);
        let config = Config::default_config();

        assert_eq!(config.db_path.as_deref(), Some("/srv/depot/db"));
        assert_eq!(config.storage_path.as_deref(), Some("/srv/depot/storage"));
        assert_eq!(config.index_url.as_deref(), Some(DEFAULT_INDEX_URL));
        assert_eq!(config.ownership(), Ownership::Required);
        assert_eq!(config.version_match(), VersionMatch::Exact);
        assert!(config.scratch_path.is_none());
    }

    #[test]
    #[serial]
    fn test_resolve_fills_defaults() {
        let mut config: Config = toml::from_str("index_url = \"https://pypi.internal/\"").unwrap();
        config.resolve().unwrap();

        assert!(config.db_path.is_some());
        assert_eq!(config.index_url(), "https://pypi.internal");
        assert_eq!(config.ownership(), Ownership::Required);
        assert_eq!(config.get_timeout().unwrap(), Duration::from_secs(60));
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_bad_index_url() {
        let mut config = Config::default_config();
        config.index_url = Some("ftp://mirror.example.com".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidIndexUrl(_))));

        config.index_url = Some("not a url".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidIndexUrl(_))));
    }

    #[test]
    #[serial]
    fn test_resolve_rejects_bad_timeout() {
        let mut config = Config::default_config();
        config.timeout = Some("soon".to_string());
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidDuration(_))));
    }

    #[test]
    fn test_policies_deserialize_lowercase() {
        let config: Config =
            toml::from_str("ownership = \"disabled\"\nversion_match = \"normalized\"").unwrap();
        assert_eq!(config.ownership(), Ownership::Disabled);
        assert_eq!(config.version_match(), VersionMatch::Normalized);
    }

    #[test]
    #[serial]
    fn test_path_env_overrides() {
        let _env = EnvGuard::set(&[
            ("DEPOT_DB", "/custom/db"),
            ("DEPOT_STORAGE", "/custom/storage"),
            ("DEPOT_INDEX_URL", "http://localhost:8080/"),
        ]);

        let config = Config::default_config();
        assert_eq!(config.get_db_path().unwrap(), PathBuf::from("/custom/db"));
        assert_eq!(
            config.get_db_file().unwrap(),
            PathBuf::from("/custom/db/depot.db")
        );
        assert_eq!(
            config.get_storage_path().unwrap(),
            PathBuf::from("/custom/storage")
        );
        assert_eq!(config.index_url(), "http://localhost:8080");
    }

    #[test]
    #[serial]
    fn test_config_round_trips_through_toml() {
        let config = Config::default_config();
        let serialized = toml::to_string(&config).unwrap();
        let mut parsed: Config = toml::from_str(&serialized).unwrap();
        parsed.resolve().unwrap();
        assert_eq!(parsed.index_url, config.index_url);
    }

    #[test]
    #[serial]
    fn test_generate_default_config_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depot/config.toml");
        let previous = config_path();
        set_config_path(path.clone());

        generate_default_config().unwrap();
        assert!(path.is_file());
        assert!(matches!(
            generate_default_config(),
            Err(ConfigError::ConfigAlreadyExists)
        ));

        set_config_path(previous);
    }
}
