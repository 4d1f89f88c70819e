//! Processing of `add` labels, one scratch directory per label.

use std::{fmt, path::PathBuf};

use depot_dl::traits::DistributionResolver;
use depot_package::MetadataExtractor;
use diesel::SqliteConnection;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::{
    error::{DepotError, ErrorContext},
    register::{RegisterOutcome, Registrar},
    DepotResult,
};

/// Result of processing one label. `Display` renders the line reported to
/// the user.
#[derive(Debug)]
pub enum LabelOutcome {
    Registered { name: String, version: String },
    AlreadyRegistered { name: String, version: String },
    NotFound { label: String },
    Failed { label: String, error: DepotError },
}

impl LabelOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Failed { .. })
    }
}

impl From<RegisterOutcome> for LabelOutcome {
    fn from(outcome: RegisterOutcome) -> Self {
        match outcome {
            RegisterOutcome::Registered { name, version } => Self::Registered { name, version },
            RegisterOutcome::AlreadyRegistered { name, version } => {
                Self::AlreadyRegistered { name, version }
            }
        }
    }
}

impl fmt::Display for LabelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered { name, version } => write!(f, "{name}-{version} added"),
            Self::AlreadyRegistered { name, version } => {
                write!(f, "{name}-{version} already added")
            }
            Self::NotFound { label } => write!(f, "Could not add {label}. Not found."),
            Self::Failed {
                error: error @ DepotError::MetadataUnavailable { .. },
                ..
            } => write!(f, "{error}"),
            Self::Failed { label, error } => write!(f, "Could not add {label}. {error}"),
        }
    }
}

pub struct LabelDriver<R, E> {
    resolver: R,
    registrar: Registrar<E>,
    scratch_root: Option<PathBuf>,
}

impl<R, E> LabelDriver<R, E>
where
    R: DistributionResolver,
    E: MetadataExtractor,
{
    pub fn new(resolver: R, registrar: Registrar<E>) -> Self {
        Self {
            resolver,
            registrar,
            scratch_root: None,
        }
    }

    /// Creates scratch directories under `root` instead of the system
    /// temporary directory.
    pub fn with_scratch_root(mut self, root: Option<PathBuf>) -> Self {
        self.scratch_root = root;
        self
    }

    fn scratch_dir(&self) -> DepotResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("depot.").suffix(".tmp");

        match &self.scratch_root {
            Some(root) => {
                builder
                    .tempdir_in(root)
                    .with_context(|| format!("creating scratch directory in {}", root.display()))
            }
            None => builder
                .tempdir()
                .with_context(|| "creating scratch directory".to_string()),
        }
    }

    /// Resolves, downloads and registers one label. Every failure is folded
    /// into the outcome; the scratch directory is gone when this returns.
    pub fn process_label(
        &self,
        conn: &mut SqliteConnection,
        label: &str,
        owner: Option<&str>,
    ) -> LabelOutcome {
        let scratch = match self.scratch_dir() {
            Ok(scratch) => scratch,
            Err(error) => {
                return LabelOutcome::Failed {
                    label: label.to_string(),
                    error,
                }
            }
        };
        debug!("processing {} in {}", label, scratch.path().display());

        let outcome = match self.resolver.download(label, scratch.path()) {
            Ok(None) => LabelOutcome::NotFound {
                label: label.to_string(),
            },
            Ok(Some(path)) => {
                match self.registrar.register(conn, &path, owner) {
                    Ok(outcome) => outcome.into(),
                    Err(error) => {
                        LabelOutcome::Failed {
                            label: label.to_string(),
                            error,
                        }
                    }
                }
            }
            Err(error) => {
                LabelOutcome::Failed {
                    label: label.to_string(),
                    error: error.into(),
                }
            }
        };

        let scratch_path = scratch.path().to_path_buf();
        if let Err(err) = scratch.close() {
            warn!(
                "failed to remove scratch directory {}: {}",
                scratch_path.display(),
                err
            );
        }

        outcome
    }

    /// Processes every label in order. A failing label never stops the
    /// ones after it.
    pub fn process<'a, I>(
        &self,
        conn: &mut SqliteConnection,
        labels: I,
        owner: Option<&str>,
    ) -> Vec<LabelOutcome>
    where
        I: IntoIterator<Item = &'a str>,
    {
        labels
            .into_iter()
            .map(|label| self.process_label(conn, label, owner))
            .collect()
    }
}
