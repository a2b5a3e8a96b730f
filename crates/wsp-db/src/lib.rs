//! PostgreSQL store gateway for sensor measurements
//!
//! One table per measurement category plus a `users` table. The schema is
//! created on startup when absent; there are no migrations.

pub mod client;
pub mod queries;
pub mod schema;

pub use client::*;
pub use schema::*;

use thiserror::Error;
use wsp_core::StoreError;

/// SQLSTATE codes that map to a conflict
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Classify a driver error by SQLSTATE
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return DbError::NotFound;
        }
        if let Some(db_err) = err.as_database_error() {
            let code = db_err.code().map(|code| code.into_owned());
            if matches!(code.as_deref(), Some(UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION)) {
                return DbError::ConstraintViolation(db_err.message().to_string());
            }
        }
        DbError::ConnectionError(err)
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => StoreError::NotFound("record not found".to_string()),
            DbError::ConstraintViolation(message) => StoreError::Conflict(message),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DbError::classify(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::NotFound));
        assert!(matches!(StoreError::from(err), StoreError::NotFound(_)));
    }

    #[test]
    fn test_constraint_violation_maps_to_conflict() {
        let err = DbError::ConstraintViolation("duplicate key".into());
        match StoreError::from(err) {
            StoreError::Conflict(message) => assert_eq!(message, "duplicate key"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_are_backend_failures() {
        let err = DbError::classify(sqlx::Error::PoolTimedOut);
        assert!(matches!(StoreError::from(err), StoreError::Backend(_)));
    }
}
