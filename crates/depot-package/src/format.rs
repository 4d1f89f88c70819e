use std::path::Path;

/// Archive layouts a distribution can be shipped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Gzip compressed tarball (`.tar.gz`, `.tgz`).
    TarGz,
    /// Bzip2 compressed tarball (`.tar.bz2`, `.tbz`, `.tbz2`).
    TarBz2,
    /// Plain tarball.
    Tar,
    /// Zip source distribution.
    Zip,
    /// Setuptools egg, a zip with `EGG-INFO/PKG-INFO`.
    Egg,
    /// Wheel, a zip with `<name>.dist-info/METADATA`.
    Wheel,
}

impl ArchiveFormat {
    /// Detects the format from the file name. Returns `None` for anything
    /// unsupported.
    pub fn detect<P: AsRef<Path>>(path: P) -> Option<Self> {
        let name = path.as_ref().file_name()?.to_str()?.to_ascii_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") || name.ends_with(".tbz") || name.ends_with(".tbz2")
        {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".egg") {
            Some(Self::Egg)
        } else if name.ends_with(".whl") {
            Some(Self::Wheel)
        } else {
            None
        }
    }

    pub fn is_sdist(&self) -> bool {
        matches!(self, Self::TarGz | Self::TarBz2 | Self::Tar | Self::Zip)
    }
}
