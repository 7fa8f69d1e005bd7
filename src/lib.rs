//! # Coffeehouse - typed table mappings over SQLite
//!
//! Two tables, `SUPPLIERS` and `COFFEES`, mapped onto plain Rust records with
//! a foreign key between them, plus a small query builder that renders
//! parameterized SQL.
//!
//! Coffeehouse provides:
//! - Explicit row projections for [`Supplier`] and [`Coffee`]
//! - Typed column and table handles with a declared foreign key
//! - Query composition: filter, sort, joins, union, aggregates, subqueries
//! - A [`Session`] handle that owns the connection and executes everything

pub mod supplier;
pub mod coffee;
pub mod query;
pub mod storage;
pub mod seed;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use supplier::Supplier;
pub use coffee::Coffee;
pub use query::{Column, Expr, FromRow, Order, Query, Table, TableHandle, cross_join, inner_join};
pub use storage::{ConnectionTarget, Session, with_session};
pub use storage::schema::{COFFEES, SUPPLIERS, SUP_FK, coffees, suppliers};

use rusqlite::ErrorCode;

/// Result type alias for Coffeehouse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Coffeehouse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid connection string: {0}")]
    InvalidTarget(String),

    #[error("Storage error: {0}")]
    Storage(#[source] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Error::ConstraintViolation(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        // Prepare failures carry the offending SQL and no error code
        if let rusqlite::Error::SqlInputError { .. } = err {
            return Error::Query(err.to_string());
        }
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => Error::ConstraintViolation(err.to_string()),
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::PermissionDenied
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure,
            ) => Error::Connection(err.to_string()),
            Some(ErrorCode::TypeMismatch) => Error::Decode(err.to_string()),
            Some(ErrorCode::Unknown) => Error::Query(err.to_string()),
            _ => match err {
                rusqlite::Error::InvalidColumnType(..)
                | rusqlite::Error::InvalidColumnIndex(_)
                | rusqlite::Error::InvalidColumnName(_)
                | rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..) => Error::Decode(err.to_string()),
                other => Error::Storage(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_malformed_sql_is_query_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err: Error = conn.prepare("SELEC 1").err().unwrap().into();
        assert!(matches!(err, Error::Query(_)), "got {:?}", err);

        let err: Error = conn.prepare("SELECT NOPE FROM sqlite_master").err().unwrap().into();
        assert!(matches!(err, Error::Query(_)), "got {:?}", err);
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let err = Error::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, Error::Storage(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
