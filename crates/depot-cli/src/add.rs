use depot_config::config::Config;
use depot_core::{
    database::open_database,
    driver::{LabelDriver, LabelOutcome},
    register::Registrar,
    storage::ContentStore,
    DepotResult,
};
use depot_dl::{http_client::ClientConfig, index::PackageIndex};
use depot_package::ArchiveMetadataExtractor;
use depot_utils::fs::ensure_dir_exists;
use nu_ansi_term::Color::{Green, Red, Yellow};
use tracing::{debug, info};

use crate::{
    progress::{create_download_job, handle_download_progress},
    utils::Colored,
};

fn report(outcome: &LabelOutcome) {
    let color = match outcome {
        LabelOutcome::Registered { .. } => Green,
        LabelOutcome::AlreadyRegistered { .. } => Yellow,
        LabelOutcome::NotFound { .. } | LabelOutcome::Failed { .. } => Red,
    };
    info!("{}", Colored(color, outcome));
}

/// Adds every label in turn, reporting one line per label. Per-label
/// failures are reported and skipped; only setup failures are returned.
pub fn add_labels(
    config: &Config,
    client: &ClientConfig,
    labels: &[String],
    owner: Option<&str>,
) -> DepotResult<()> {
    let mut db = open_database(config)?;

    let store = ContentStore::new(config.get_storage_path()?);
    let registrar = Registrar::new(ArchiveMetadataExtractor::new(), store)
        .with_ownership(config.ownership().into())
        .with_version_match(config.version_match().into());

    let pb = create_download_job();
    let index = PackageIndex::new(config.index_url(), client)
        .with_progress(move |state| handle_download_progress(state, &pb));
    debug!("resolving requirements against {}", index.index_url());

    let scratch_root = config.get_scratch_path()?;
    if let Some(root) = &scratch_root {
        ensure_dir_exists(root)?;
    }
    let driver = LabelDriver::new(index, registrar).with_scratch_root(scratch_root);

    for label in labels {
        let outcome = driver.process_label(db.conn(), label, owner);
        if let LabelOutcome::Failed { error, .. } = &outcome {
            debug!("{:?}", error);
        }
        report(&outcome);
    }

    Ok(())
}
