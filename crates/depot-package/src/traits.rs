//! Seams between metadata extraction and its consumers.

use std::{collections::BTreeMap, path::Path};

use crate::{error::Result, metadata::FieldValue};

/// Anything exposing a name, a version and an enumerable attribute set.
pub trait PackageMetadata {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// All attributes of the record, keyed by normalised field name.
    fn attributes(&self) -> &BTreeMap<String, FieldValue>;
}

/// Reads the metadata of a downloaded distribution.
pub trait MetadataExtractor {
    type Metadata: PackageMetadata;

    /// Returns `Ok(None)` when the file carries no usable metadata.
    fn get_metadata(&self, path: &Path) -> Result<Option<Self::Metadata>>;
}
