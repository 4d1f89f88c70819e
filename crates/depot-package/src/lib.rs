//! Metadata extraction from Python distribution archives.
//!
//! This crate reads the core metadata (`PKG-INFO` or `METADATA`) stored inside
//! source distributions, eggs and wheels, and exposes it through the
//! [`PackageMetadata`] capability consumed by the registration workflow.
//!
//! # Modules
//!
//! - [`archive`]: Locating the metadata file inside an archive
//! - [`error`]: Error types for package operations
//! - [`format`]: Archive format detection
//! - [`metadata`]: Parsing of RFC 822 style metadata
//! - [`traits`]: The extractor and metadata seams

pub mod archive;
pub mod error;
pub mod format;
pub mod metadata;
pub mod traits;

pub use archive::ArchiveMetadataExtractor;
pub use error::{PackageError, Result};
pub use format::ArchiveFormat;
pub use metadata::{CoreMetadata, FieldValue};
pub use traits::{MetadataExtractor, PackageMetadata};
