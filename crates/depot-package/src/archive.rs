//! Locating the metadata file inside distribution archives.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Component, Path, PathBuf},
};

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use tar::Archive as TarArchive;
use tracing::debug;
use zip::ZipArchive;

use crate::{
    error::{ErrorContext, PackageError, Result},
    format::ArchiveFormat,
    metadata::CoreMetadata,
    traits::MetadataExtractor,
};

/// Upper bound for a metadata file read into memory.
pub const MAX_METADATA_SIZE: u64 = 16 * 1024 * 1024;

/// Which archive member holds the metadata for a given format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataLocation {
    /// The shallowest `PKG-INFO` anywhere in the archive.
    ShallowestPkgInfo,
    /// `EGG-INFO/PKG-INFO` at the archive root.
    EggInfo,
    /// `<name>.dist-info/METADATA` at the archive root.
    DistInfo,
}

impl MetadataLocation {
    fn for_format(format: ArchiveFormat) -> Self {
        match format {
            ArchiveFormat::TarGz
            | ArchiveFormat::TarBz2
            | ArchiveFormat::Tar
            | ArchiveFormat::Zip => Self::ShallowestPkgInfo,
            ArchiveFormat::Egg => Self::EggInfo,
            ArchiveFormat::Wheel => Self::DistInfo,
        }
    }

    /// Returns the depth of a matching member, lower is preferred.
    fn rank(&self, member: &Path) -> Option<usize> {
        let parts: Vec<&str> = member
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();

        match self {
            Self::ShallowestPkgInfo => (parts.last() == Some(&"PKG-INFO")).then_some(parts.len()),
            Self::EggInfo => (parts == ["EGG-INFO", "PKG-INFO"]).then_some(parts.len()),
            Self::DistInfo => {
                (parts.len() == 2 && parts[0].ends_with(".dist-info") && parts[1] == "METADATA")
                    .then_some(parts.len())
            }
        }
    }
}

/// [`MetadataExtractor`] reading sdists, eggs and wheels from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct ArchiveMetadataExtractor;

impl ArchiveMetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Returns the raw metadata text of an archive, if it has any.
    pub fn read_metadata_file(&self, path: &Path) -> Result<Option<String>> {
        let Some(format) = ArchiveFormat::detect(path) else {
            debug!("unsupported archive format: {}", path.display());
            return Ok(None);
        };
        let location = MetadataLocation::for_format(format);

        let bytes = match format {
            ArchiveFormat::TarGz => {
                let file = open(path)?;
                read_from_tar(TarArchive::new(GzDecoder::new(file)), path, location)?
            }
            ArchiveFormat::TarBz2 => {
                let file = open(path)?;
                read_from_tar(TarArchive::new(BzDecoder::new(file)), path, location)?
            }
            ArchiveFormat::Tar => read_from_tar(TarArchive::new(open(path)?), path, location)?,
            ArchiveFormat::Zip | ArchiveFormat::Egg | ArchiveFormat::Wheel => {
                read_from_zip(path, location)?
            }
        };

        Ok(bytes.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}

impl MetadataExtractor for ArchiveMetadataExtractor {
    type Metadata = CoreMetadata;

    fn get_metadata(&self, path: &Path) -> Result<Option<CoreMetadata>> {
        let Some(content) = self.read_metadata_file(path)? else {
            debug!("no metadata file found in {}", path.display());
            return Ok(None);
        };

        Ok(CoreMetadata::parse(&content))
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("opening {}", path.display()))
}

fn read_member<R: Read>(reader: R, archive: &Path) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take(MAX_METADATA_SIZE + 1)
        .read_to_end(&mut buf)
        .with_context(|| format!("reading metadata from {}", archive.display()))?;

    if buf.len() as u64 > MAX_METADATA_SIZE {
        return Err(PackageError::MetadataTooLarge {
            path: archive.to_path_buf(),
            limit: MAX_METADATA_SIZE,
        });
    }
    Ok(buf)
}

fn read_from_tar<R: Read>(
    mut archive: TarArchive<R>,
    path: &Path,
    location: MetadataLocation,
) -> Result<Option<Vec<u8>>> {
    let mut best: Option<(usize, Vec<u8>)> = None;

    let entries = archive
        .entries()
        .with_context(|| format!("reading entries of {}", path.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry of {}", path.display()))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let member: PathBuf = entry
            .path()
            .with_context(|| format!("reading entry path in {}", path.display()))?
            .into_owned();

        let Some(depth) = location.rank(&member) else {
            continue;
        };
        if best.as_ref().is_some_and(|(best_depth, _)| *best_depth <= depth) {
            continue;
        }

        debug!("found metadata candidate {}", member.display());
        best = Some((depth, read_member(entry, path)?));
    }

    Ok(best.map(|(_, bytes)| bytes))
}

fn read_from_zip(path: &Path, location: MetadataLocation) -> Result<Option<Vec<u8>>> {
    let zip_error = |source| PackageError::ZipError {
        path: path.to_path_buf(),
        source,
    };
    let mut archive = ZipArchive::new(open(path)?).map_err(zip_error)?;

    let best = archive
        .file_names()
        .filter_map(|name| location.rank(Path::new(name)).map(|depth| (depth, name)))
        .min_by_key(|(depth, _)| *depth)
        .map(|(_, name)| name.to_string());

    let Some(name) = best else {
        return Ok(None);
    };

    debug!("found metadata member {}", name);
    let member = archive.by_name(&name).map_err(zip_error)?;
    read_member(member, path).map(Some)
}
