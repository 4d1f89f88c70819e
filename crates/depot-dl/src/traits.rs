use std::path::{Path, PathBuf};

use crate::error::DownloadError;

/// Locates a distribution for a label and places it in a directory.
pub trait DistributionResolver {
    /// Downloads the distribution named by `label` into `dest_dir`.
    ///
    /// Returns `Ok(None)` when nothing matches the label.
    fn download(&self, label: &str, dest_dir: &Path) -> Result<Option<PathBuf>, DownloadError>;
}
