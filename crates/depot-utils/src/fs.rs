use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::{FileSystemError, FileSystemResult};

fn file_error(path: &Path, action: &'static str) -> impl FnOnce(io::Error) -> FileSystemError {
    let path = path.to_path_buf();
    move |source| FileSystemError::File {
        path,
        action,
        source,
    }
}

/// Removes a file or a whole directory tree. A missing path is not an error.
pub fn safe_remove<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => Err(err),
    };

    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other.map_err(file_error(path, "remove")),
    }
}

/// Creates `path` and its parents unless it already is a directory.
///
/// # Errors
///
/// * [`FileSystemError::Directory`] if the directory could not be created.
/// * [`FileSystemError::NotADirectory`] if something else occupies the path.
pub fn ensure_dir_exists<P: AsRef<Path>>(path: P) -> FileSystemResult<()> {
    let path = path.as_ref();

    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(FileSystemError::NotADirectory {
            path: path.to_path_buf(),
        });
    }

    fs::create_dir_all(path).map_err(|source| {
        FileSystemError::Directory {
            path: path.to_path_buf(),
            action: "create",
            source,
        }
    })
}

/// Copies `src` into `dir` under its own file name and returns the new path.
pub fn copy_into<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dir: Q) -> FileSystemResult<PathBuf> {
    let src = src.as_ref();
    let file_name = src.file_name().ok_or_else(|| {
        file_error(src, "copy")(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path has no file name",
        ))
    })?;

    let dir = dir.as_ref();
    ensure_dir_exists(dir)?;

    let dest = dir.join(file_name);
    fs::copy(src, &dest).map_err(file_error(src, "copy"))?;
    Ok(dest)
}
