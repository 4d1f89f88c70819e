//! Error types for depot-db.

use diesel::result::DatabaseErrorKind;
use miette::Diagnostic;
use thiserror::Error;

/// Database error type for depot-db operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(depot_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(code(depot_db::query))]
    QueryError(String),

    #[error("Record not found: {0}")]
    #[diagnostic(code(depot_db::not_found))]
    NotFound(String),

    #[error("Uniqueness constraint violated: {0}")]
    #[diagnostic(
        code(depot_db::unique_violation),
        help("Another writer registered the same record concurrently")
    )]
    UniqueViolation(String),

    #[error("Database integrity error: {0}")]
    #[diagnostic(
        code(depot_db::integrity),
        help("The database may be corrupted. Check foreign key references.")
    )]
    IntegrityError(String),
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DbError::UniqueViolation(_))
    }
}

/// Returns true when a diesel error came from a UNIQUE constraint.
pub fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => DbError::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DbError::UniqueViolation(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                DbError::IntegrityError(info.message().to_string())
            }
            diesel::result::Error::DatabaseError(_, info) => {
                DbError::QueryError(info.message().to_string())
            }
            other => DbError::QueryError(other.to_string()),
        }
    }
}

impl From<diesel::result::ConnectionError> for DbError {
    fn from(err: diesel::result::ConnectionError) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}

/// Result type alias for depot-db operations.
pub type Result<T> = std::result::Result<T, DbError>;
