//! On-disk storage of distribution files.

use std::{
    fs::{File, OpenOptions},
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use depot_utils::{
    fs::{ensure_dir_exists, safe_remove},
    hash::digest_file,
};
use tracing::debug;

use crate::{error::ErrorContext, DepotResult};

/// Extensions that are kept together when a file name has to be made unique.
const COMPOUND_EXTENSIONS: [&str; 2] = [".tar.gz", ".tar.bz2"];

/// A file written into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContent {
    /// Path relative to the store root, with `/` separators.
    pub relative_path: String,
    pub size: u64,
    /// Hex-encoded blake3 hash.
    pub checksum: String,
}

/// Distribution files live under `<root>/dists/<package>/<filename>`.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

/// Replaces anything that could escape the target directory.
fn path_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        _ => cleaned,
    }
}

/// Splits `foo-1.0.tar.gz` into `("foo-1.0", ".tar.gz")`.
fn split_extension(filename: &str) -> (&str, &str) {
    let lower = filename.to_ascii_lowercase();
    if let Some(ext) = COMPOUND_EXTENSIONS.iter().find(|ext| lower.ends_with(*ext)) {
        let at = filename.len() - ext.len();
        if at > 0 {
            return filename.split_at(at);
        }
    }

    match filename.rfind('.') {
        Some(at) if at > 0 => filename.split_at(at),
        _ => (filename, ""),
    }
}

impl ContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a stored file.
    pub fn path_of(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Creates the first free name among `<filename>`, `<stem>_1<ext>`, ...
    fn create_unique(&self, dir: &Path, filename: &str) -> DepotResult<(String, File)> {
        let (stem, ext) = split_extension(filename);
        let mut candidate = filename.to_string();
        let mut n = 0u32;

        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(dir.join(&candidate))
            {
                Ok(file) => return Ok((candidate, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    n += 1;
                    candidate = format!("{stem}_{n}{ext}");
                }
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("creating {}", dir.join(&candidate).display())
                    })
                }
            }
        }
    }

    /// Copies `source` into the store under the package's directory and
    /// returns where it landed.
    pub fn store(&self, package: &str, source: &Path, filename: &str) -> DepotResult<StoredContent> {
        let package_dir = path_component(package);
        let dir = self.root.join("dists").join(&package_dir);
        ensure_dir_exists(&dir)?;

        let (name, mut file) = self.create_unique(&dir, &path_component(filename))?;
        let target = dir.join(&name);

        let copied = File::open(source)
            .and_then(|mut input| io::copy(&mut input, &mut file))
            .and_then(|_| file.sync_all());
        if let Err(err) = copied {
            drop(file);
            let _ = safe_remove(&target);
            return Err(err).with_context(|| {
                format!("copying {} to {}", source.display(), target.display())
            });
        }

        let digest = digest_file(&target)?;
        let relative_path = format!("dists/{package_dir}/{name}");
        debug!(
            "stored {} ({} bytes) as {}",
            source.display(),
            digest.size,
            relative_path
        );

        Ok(StoredContent {
            relative_path,
            size: digest.size,
            checksum: digest.checksum,
        })
    }

    /// Deletes a stored file, tolerating its absence.
    pub fn remove(&self, relative_path: &str) -> DepotResult<()> {
        safe_remove(self.path_of(relative_path))?;
        Ok(())
    }
}
