//! Database connection management.

use std::path::Path;

use diesel::{sql_query, Connection, ConnectionError, RunQueryDsl, SqliteConnection};

use crate::migration::apply_migrations;

/// Database connection wrapper with migration support.
pub struct DbConnection {
    conn: SqliteConnection,
}

impl DbConnection {
    /// Opens the catalogue database and runs pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails, a pragma cannot be applied,
    /// or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ConnectionError> {
        let path_str = path.as_ref().to_string_lossy();
        let mut conn = SqliteConnection::establish(&path_str)?;

        for pragma in [
            "PRAGMA journal_mode = WAL;",
            "PRAGMA foreign_keys = ON;",
            "PRAGMA busy_timeout = 5000;",
        ] {
            sql_query(pragma)
                .execute(&mut conn)
                .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;
        }

        apply_migrations(&mut conn).map_err(|e| ConnectionError::BadConnection(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Gets a mutable reference to the underlying connection.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

impl std::ops::Deref for DbConnection {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl std::ops::DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}
