use depot_config::config::Config;
use depot_core::{database::open_database, list::list_packages as catalogue, DepotResult};
use nu_ansi_term::Color::{Blue, Cyan};
use tracing::info;

use crate::utils::Colored;

pub fn list_packages(config: &Config) -> DepotResult<()> {
    let mut db = open_database(config)?;
    let packages = catalogue(db.conn())?;

    if packages.is_empty() {
        info!("No packages in the index");
        return Ok(());
    }

    for package in &packages {
        let owner = package.owner.as_deref().unwrap_or("-");
        info!(
            "{} ({})",
            Colored(Blue, &package.name),
            Colored(Cyan, owner)
        );
        for release in &package.releases {
            info!("  {}: {}", release.version, release.files.join(", "));
        }
    }

    info!("{} packages", packages.len());
    Ok(())
}
