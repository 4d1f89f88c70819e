use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to read file `{}`: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Failed to get current directory: {source}")]
    CurrentDir { source: std::io::Error },

    #[error("Path is empty")]
    Empty,

    #[error("Environment variable `{var}` not set in `{input}`")]
    MissingEnvVar { var: String, input: String },

    #[error("Unclosed variable expression starting at `{input}`")]
    UnclosedVariable { input: String },
}

/// Filesystem failure tagged with the path and what was being done to it.
#[derive(Error, Debug)]
pub enum FileSystemError {
    #[error("Failed to {action} file `{}`: {source}", path.display())]
    File {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },

    #[error("Failed to {action} directory `{}`: {source}", path.display())]
    Directory {
        path: PathBuf,
        action: &'static str,
        source: std::io::Error,
    },

    #[error("`{}` is not a directory", path.display())]
    NotADirectory { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("{0}")]
    Hash(#[from] HashError),

    #[error("{0}")]
    Path(#[from] PathError),

    #[error("{0}")]
    FileSystem(#[from] FileSystemError),
}

pub type FileSystemResult<T> = std::result::Result<T, FileSystemError>;
pub type HashResult<T> = std::result::Result<T, HashError>;
pub type PathResult<T> = std::result::Result<T, PathError>;
pub type UtilsResult<T> = std::result::Result<T, UtilsError>;

#[cfg(test)]
mod tests {
    use std::{error::Error as _, io};

    use super::*;

    #[test]
    fn test_hash_error_names_the_file() {
        let error = HashError::ReadFailed {
            path: PathBuf::from("/dists/foo-1.0.tar.gz"),
            source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
        };
        assert_eq!(
            error.to_string(),
            "Failed to read file `/dists/foo-1.0.tar.gz`: file not found"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_missing_env_var_message() {
        let missing = PathError::MissingEnvVar {
            var: "DEPOT_ROOT".to_string(),
            input: "$DEPOT_ROOT/db".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "Environment variable `DEPOT_ROOT` not set in `$DEPOT_ROOT/db`"
        );
        assert!(missing.source().is_none());
    }

    #[test]
    fn test_directory_errors() {
        let err = FileSystemError::Directory {
            path: PathBuf::from("/srv/depot"),
            action: "create",
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to create directory `/srv/depot`: permission denied"
        );

        let not_dir = FileSystemError::NotADirectory {
            path: PathBuf::from("/srv/depot/db"),
        };
        assert_eq!(not_dir.to_string(), "`/srv/depot/db` is not a directory");
    }

    #[test]
    fn test_utils_error_keeps_inner_error() {
        let err = UtilsError::from(PathError::Empty);
        assert_eq!(err.to_string(), "Path is empty");
        assert!(err.source().is_some());
    }
}
