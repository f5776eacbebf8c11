//! Custom error types for the common library
//!
//! This module defines application-specific error types that can be used
//! throughout the application.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// PostgreSQL SQLSTATE for `unique_violation`
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL SQLSTATE for `foreign_key_violation`
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Returns true when the error is a PostgreSQL unique constraint violation
pub fn is_unique_violation(err: &SqlxError) -> bool {
    has_code(err, UNIQUE_VIOLATION)
}

/// Returns true when the error is a PostgreSQL foreign key violation
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

fn has_code(err: &SqlxError, code: &str) -> bool {
    match err {
        SqlxError::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}
