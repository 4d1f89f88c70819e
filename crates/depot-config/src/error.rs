use depot_utils::error::{PathError, UtilsError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(depot_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(depot_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(depot_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid index URL: {0}")]
    #[diagnostic(
        code(depot_config::invalid_index_url),
        help("Use an absolute http(s) URL such as https://pypi.org")
    )]
    InvalidIndexUrl(String),

    #[error("Invalid duration: {0}")]
    #[diagnostic(
        code(depot_config::invalid_duration),
        help("Use a duration such as 30s, 2m or 1h30m")
    )]
    InvalidDuration(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(depot_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(depot_config::utils))]
    Utils(#[from] UtilsError),
}

impl From<PathError> for ConfigError {
    fn from(err: PathError) -> Self {
        Self::Utils(UtilsError::Path(err))
    }
}

impl From<depot_utils::error::FileSystemError> for ConfigError {
    fn from(err: depot_utils::error::FileSystemError) -> Self {
        Self::Utils(UtilsError::FileSystem(err))
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
