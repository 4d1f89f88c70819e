//! Read-only views of the catalogue.

use depot_db::repository::{
    distributions::DistributionRepository, packages::PackageRepository,
    releases::ReleaseRepository, users::UserRepository,
};
use diesel::SqliteConnection;

use crate::DepotResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub version: String,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    pub name: String,
    pub owner: Option<String>,
    pub releases: Vec<ReleaseSummary>,
}

impl PackageSummary {
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.releases.iter().map(|release| release.version.as_str())
    }
}

/// Lists packages by name, each with its releases in registration order.
pub fn list_packages(conn: &mut SqliteConnection) -> DepotResult<Vec<PackageSummary>> {
    let packages = PackageRepository::list_all(conn)?;
    let mut summaries = Vec::with_capacity(packages.len());

    for package in packages {
        let owner = match package.owner_id {
            Some(id) => UserRepository::find_by_id(conn, id)?.map(|user| user.username),
            None => None,
        };

        let mut releases = Vec::new();
        for release in ReleaseRepository::list_for_package(conn, package.id)? {
            let files = DistributionRepository::list_for_release(conn, release.id)?
                .into_iter()
                .map(|dist| dist.filename)
                .collect();
            releases.push(ReleaseSummary {
                version: release.version,
                files,
            });
        }

        summaries.push(PackageSummary {
            name: package.name,
            owner,
            releases,
        });
    }

    Ok(summaries)
}
