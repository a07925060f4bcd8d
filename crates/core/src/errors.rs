//! Core error types for the Vehicle Manager.
//!
//! This module defines store-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, reqwest, etc.) are converted to these types by the
//! crate that owns the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for vehicle operations.
///
/// Database-specific errors are wrapped in string form to keep this type
/// store-agnostic.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Vehicle not found: {0}")]
    NotFound(String),

    #[error("Data source unreachable: {0}")]
    Connectivity(String),

    #[error("Malformed response from data source: {0}")]
    Protocol(String),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Failure classification shared by every data source.
///
/// Presentation layers only ever see one of these four kinds; the concrete
/// `Error` variant carries the detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Connectivity,
    Protocol,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not found",
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Protocol => "protocol",
        }
    }
}

impl Error {
    /// Classifies this error into one of the four kinds callers react to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Connectivity(_) => ErrorKind::Connectivity,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::Database(db) => match db {
                DatabaseError::NotFound(_) => ErrorKind::NotFound,
                DatabaseError::ConnectionFailed(_)
                | DatabaseError::PoolCreationFailed(_)
                | DatabaseError::Timeout(_) => ErrorKind::Connectivity,
                DatabaseError::QueryFailed(_)
                | DatabaseError::MigrationFailed(_)
                | DatabaseError::Internal(_) => ErrorKind::Protocol,
            },
            Error::InvalidConfigValue(_) => ErrorKind::Connectivity,
            Error::Unexpected(_) => ErrorKind::Protocol,
        }
    }

    pub fn not_found(id: i64) -> Self {
        Error::NotFound(format!("no vehicle with id {}", id))
    }
}

/// Store-agnostic error type for database operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert Diesel/r2d2 errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A write did not complete within the configured timeout.
    #[error("Database operation timed out after {0} ms")]
    Timeout(u64),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// The requested record was not found.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for caller-supplied vehicle data.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}
