use depot_config::config::Config;
use depot_db::connection::DbConnection;
use depot_utils::fs::ensure_dir_exists;
use tracing::debug;

use crate::DepotResult;

/// Opens the catalogue database configured in `config`, creating its
/// directory and schema when needed.
pub fn open_database(config: &Config) -> DepotResult<DbConnection> {
    let db_dir = config.get_db_path()?;
    ensure_dir_exists(&db_dir)?;

    let db_file = config.get_db_file()?;
    debug!("opening database {}", db_file.display());
    Ok(DbConnection::open(&db_file)?)
}
