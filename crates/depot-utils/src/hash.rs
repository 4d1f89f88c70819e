use std::path::Path;

use crate::error::{HashError, HashResult};

/// Content digest of a stored file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    /// Hex-encoded blake3 hash.
    pub checksum: String,
    /// Size in bytes.
    pub size: u64,
}

/// Calculates the blake3 checksum and size of a file in one pass.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be read.
///
/// # Example
///
/// ```no_run
/// use depot_utils::hash::digest_file;
///
/// let digest = digest_file("/srv/depot/dists/foo/foo-1.0.tar.gz").unwrap();
/// assert_eq!(digest.checksum.len(), 64);
/// ```
pub fn digest_file<P: AsRef<Path>>(file_path: P) -> HashResult<FileDigest> {
    let file_path = file_path.as_ref();
    let read_failed = |err| HashError::ReadFailed {
        path: file_path.to_path_buf(),
        source: err,
    };

    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(file_path).map_err(read_failed)?;

    Ok(FileDigest {
        checksum: hasher.finalize().to_hex().to_string(),
        size: hasher.count(),
    })
}
