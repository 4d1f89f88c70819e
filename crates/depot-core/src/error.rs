//! Error types for depot-core.

use depot_config::error::ConfigError;
use depot_db::error::DbError;
use depot_dl::error::DownloadError;
use depot_package::PackageError;
use depot_utils::error::{FileSystemError, HashError};
use miette::Diagnostic;
use thiserror::Error;

/// Core error type for depot operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DepotError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    #[diagnostic(code(depot::filesystem), help("Check file permissions and disk space"))]
    FileSystem(#[from] FileSystemError),

    #[error(transparent)]
    #[diagnostic(code(depot::hash))]
    Hash(#[from] HashError),

    #[error("Error while {action}")]
    #[diagnostic(code(depot::io), help("Check file permissions and disk space"))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(depot::serialization))]
    Serialization(#[from] serde_json::Error),

    #[error("Couldn't get metadata from {filename}. Not added.")]
    #[diagnostic(
        code(depot::metadata_unavailable),
        help("The archive must contain PKG-INFO (sdist, egg) or .dist-info/METADATA (wheel)")
    )]
    MetadataUnavailable { filename: String },

    #[error("No owner could be determined for new package '{package}'")]
    #[diagnostic(
        code(depot::no_owner),
        help("Pass --owner <username>, or add a user whose email matches the package maintainer")
    )]
    NoOwnerResolvable { package: String },

    #[error("User '{0}' does not exist")]
    #[diagnostic(code(depot::unknown_owner), help("Create it first with 'depot user add'"))]
    UnknownOwner(String),

    #[error("User '{0}' already exists")]
    #[diagnostic(code(depot::user_exists))]
    UserExists(String),

    #[error("Invalid path specified: {0}")]
    #[diagnostic(code(depot::invalid_path))]
    InvalidPath(String),

    #[error("{0}")]
    #[diagnostic(code(depot::error))]
    Custom(String),
}

impl DepotError {
    /// True when a concurrent writer won a uniqueness race.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(err) if err.is_unique_violation())
    }
}

impl From<diesel::result::Error> for DepotError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.into())
    }
}

impl From<diesel::result::ConnectionError> for DepotError {
    fn from(err: diesel::result::ConnectionError) -> Self {
        Self::Database(err.into())
    }
}

/// Trait for adding context to IO errors.
pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, DepotError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, DepotError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            DepotError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_unavailable_message() {
        let err = DepotError::MetadataUnavailable {
            filename: "foo-1.0.tar.gz".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Couldn't get metadata from foo-1.0.tar.gz. Not added."
        );
    }

    #[test]
    fn test_unique_violation_detection() {
        let err = DepotError::Database(DbError::UniqueViolation("packages.name".into()));
        assert!(err.is_unique_violation());
        assert!(!DepotError::UnknownOwner("bob".into()).is_unique_violation());
    }

    #[test]
    fn test_io_context() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = result.with_context(|| "writing foo".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Error while writing foo");
    }
}
