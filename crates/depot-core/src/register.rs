//! Registering a downloaded distribution in the catalogue.
//!
//! A registration looks the package and release up first and only writes
//! when the `(name, version)` pair is new. The package, release and
//! distribution rows are inserted in one transaction together with the
//! stored file, so a failure never leaves a release without its file.

use std::path::Path;

use depot_config::config::{Ownership, VersionMatch as ConfiguredVersionMatch};
use depot_db::{
    models::index::{NewDistribution, NewPackage, NewRelease, Package, Release},
    repository::{
        distributions::DistributionRepository, packages::PackageRepository,
        releases::ReleaseRepository, users::UserRepository,
    },
};
use depot_dl::version::ReleaseVersion;
use depot_package::{FieldValue, MetadataExtractor, PackageMetadata};
use diesel::{Connection, SqliteConnection};
use tracing::{debug, warn};

use crate::{
    error::DepotError,
    storage::{ContentStore, StoredContent},
    DepotResult,
};

/// Whether new packages need an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// New packages are registered without an owner.
    Disabled,
    /// New packages need an owner from `--owner` or the maintainer email.
    #[default]
    Required,
}

impl From<Ownership> for OwnershipPolicy {
    fn from(value: Ownership) -> Self {
        match value {
            Ownership::Required => Self::Required,
            Ownership::Disabled => Self::Disabled,
        }
    }
}

/// How an extracted version is compared with registered ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VersionMatch {
    /// String equality.
    #[default]
    Exact,
    /// Equality of parsed versions, so `1.0` and `1.0.0` are the same release.
    Normalized,
}

impl From<ConfiguredVersionMatch> for VersionMatch {
    fn from(value: ConfiguredVersionMatch) -> Self {
        match value {
            ConfiguredVersionMatch::Exact => Self::Exact,
            ConfiguredVersionMatch::Normalized => Self::Normalized,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { name: String, version: String },
    AlreadyRegistered { name: String, version: String },
}

/// Splits a maintainer email field into bare addresses.
///
/// Accepts `a@x.org`, `Name <a@x.org>` and comma separated lists of both.
pub fn email_addresses(field: &str) -> Vec<String> {
    field
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            let addr = match (part.find('<'), part.rfind('>')) {
                (Some(start), Some(end)) if start < end => &part[start + 1..end],
                _ => part,
            };
            let addr = addr.trim();
            addr.contains('@').then(|| addr.to_string())
        })
        .collect()
}

pub struct Registrar<E> {
    extractor: E,
    store: ContentStore,
    ownership: OwnershipPolicy,
    version_match: VersionMatch,
}

impl<E: MetadataExtractor> Registrar<E> {
    pub fn new(extractor: E, store: ContentStore) -> Self {
        Self {
            extractor,
            store,
            ownership: OwnershipPolicy::default(),
            version_match: VersionMatch::default(),
        }
    }

    pub fn with_ownership(mut self, ownership: OwnershipPolicy) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn with_version_match(mut self, version_match: VersionMatch) -> Self {
        self.version_match = version_match;
        self
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Registers the distribution at `path`.
    ///
    /// Fails with [`DepotError::MetadataUnavailable`] before touching the
    /// catalogue when the archive carries no usable metadata.
    pub fn register(
        &self,
        conn: &mut SqliteConnection,
        path: &Path,
        owner_hint: Option<&str>,
    ) -> DepotResult<RegisterOutcome> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| DepotError::InvalidPath(path.display().to_string()))?;

        let metadata = match self.extractor.get_metadata(path) {
            Ok(Some(metadata)) => metadata,
            Ok(None) => return Err(DepotError::MetadataUnavailable { filename }),
            Err(err) => {
                warn!("reading metadata from {} failed: {}", filename, err);
                return Err(DepotError::MetadataUnavailable { filename });
            }
        };

        self.register_metadata(conn, &metadata, path, &filename, owner_hint)
    }

    /// Registers already extracted metadata. A lost race against a
    /// concurrent writer is retried once through the lookup path.
    pub fn register_metadata<M: PackageMetadata>(
        &self,
        conn: &mut SqliteConnection,
        metadata: &M,
        path: &Path,
        filename: &str,
        owner_hint: Option<&str>,
    ) -> DepotResult<RegisterOutcome> {
        match self.try_register(conn, metadata, path, filename, owner_hint) {
            Err(err) if err.is_unique_violation() => {
                debug!(
                    "{}-{} was registered concurrently, looking it up again",
                    metadata.name(),
                    metadata.version()
                );
                self.try_register(conn, metadata, path, filename, owner_hint)
            }
            other => other,
        }
    }

    fn try_register<M: PackageMetadata>(
        &self,
        conn: &mut SqliteConnection,
        metadata: &M,
        path: &Path,
        filename: &str,
        owner_hint: Option<&str>,
    ) -> DepotResult<RegisterOutcome> {
        let name = metadata.name();
        let version = metadata.version();

        let existing = PackageRepository::find_by_name(conn, name)?;

        let owner_id = match &existing {
            Some(package) => {
                if owner_hint.is_some() {
                    debug!("keeping the recorded owner of existing package {}", package.name);
                }
                package.owner_id
            }
            None => self.resolve_owner(conn, metadata, owner_hint)?,
        };

        if let Some(package) = &existing {
            if let Some(release) = self.find_release(conn, package, version)? {
                return Ok(RegisterOutcome::AlreadyRegistered {
                    name: name.to_string(),
                    version: release.version,
                });
            }
        }

        let package_info = serde_json::to_value(metadata.attributes())?;

        let mut stored: Option<StoredContent> = None;
        let result = conn.transaction::<_, DepotError, _>(|conn| {
            let package_id = match &existing {
                Some(package) => package.id,
                None => {
                    PackageRepository::insert(
                        conn,
                        &NewPackage {
                            name,
                            owner_id,
                        },
                    )?
                }
            };

            let release_id = ReleaseRepository::insert(
                conn,
                &NewRelease {
                    package_id,
                    version,
                    package_info,
                },
            )?;

            let content = self.store.store(name, path, filename)?;
            let inserted = DistributionRepository::insert(
                conn,
                &NewDistribution {
                    release_id,
                    filename,
                    content: &content.relative_path,
                    size: content.size as i64,
                    checksum: &content.checksum,
                },
            );
            stored = Some(content);
            inserted?;

            Ok(())
        });

        if let Err(err) = result {
            if let Some(content) = stored {
                if let Err(cleanup) = self.store.remove(&content.relative_path) {
                    warn!(
                        "failed to remove {} after aborted registration: {}",
                        content.relative_path, cleanup
                    );
                }
            }
            return Err(err);
        }

        Ok(RegisterOutcome::Registered {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    fn find_release(
        &self,
        conn: &mut SqliteConnection,
        package: &Package,
        version: &str,
    ) -> DepotResult<Option<Release>> {
        match self.version_match {
            VersionMatch::Exact => Ok(ReleaseRepository::find(conn, package.id, version)?),
            VersionMatch::Normalized => {
                let wanted = ReleaseVersion::parse(version);
                Ok(ReleaseRepository::list_for_package(conn, package.id)?
                    .into_iter()
                    .find(|release| ReleaseVersion::parse(&release.version) == wanted))
            }
        }
    }

    /// Owner for a new package: the hinted user, else the first user whose
    /// email appears in `maintainer_email`.
    fn resolve_owner<M: PackageMetadata>(
        &self,
        conn: &mut SqliteConnection,
        metadata: &M,
        owner_hint: Option<&str>,
    ) -> DepotResult<Option<i32>> {
        if self.ownership == OwnershipPolicy::Disabled {
            if let Some(hint) = owner_hint {
                warn!("ownership is disabled, ignoring owner '{}'", hint);
            }
            return Ok(None);
        }

        if let Some(username) = owner_hint {
            return UserRepository::find_by_username(conn, username)?
                .map(|user| Some(user.id))
                .ok_or_else(|| DepotError::UnknownOwner(username.to_string()));
        }

        let addresses = metadata
            .attributes()
            .get("maintainer_email")
            .map(FieldValue::values)
            .into_iter()
            .flatten()
            .flat_map(email_addresses);

        for address in addresses {
            if let Some(user) = UserRepository::find_by_email(conn, &address)?.into_iter().next() {
                debug!("matched maintainer {} to user {}", address, user.username);
                return Ok(Some(user.id));
            }
        }

        Err(DepotError::NoOwnerResolvable {
            package: metadata.name().to_string(),
        })
    }
}
