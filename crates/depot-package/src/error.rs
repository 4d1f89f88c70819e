//! Error types for the package crate.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading distribution archives.
#[derive(Error, Diagnostic, Debug)]
pub enum PackageError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(depot_package::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Corrupt zip archive {path}: {source}")]
    #[diagnostic(
        code(depot_package::zip),
        help("The downloaded file is not a valid zip archive")
    )]
    ZipError {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Metadata file in {path} exceeds {limit} bytes")]
    #[diagnostic(code(depot_package::metadata_too_large))]
    MetadataTooLarge { path: PathBuf, limit: u64 },
}

/// A specialized Result type for package operations.
pub type Result<T> = std::result::Result<T, PackageError>;

/// Extension trait for adding context to I/O errors.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> Result<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            PackageError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
