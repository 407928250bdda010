//! Custom error types for the common library
//!
//! This module defines the storage error type and the input validation error
//! shared by both services.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// A rejected input value together with the field it came from
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Reject text containing U+0000, which PostgreSQL cannot store
pub fn reject_null_characters(field: &str, value: &str) -> Result<(), FieldError> {
    if value.contains('\0') {
        return Err(FieldError::new(field, "Null characters are not allowed."));
    }

    Ok(())
}

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

    /// A unique constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DatabaseError {
    /// Replace the message of a `Conflict`, leaving other variants untouched
    pub fn with_conflict_message(self, message: impl Into<String>) -> Self {
        match self {
            DatabaseError::Conflict(_) => DatabaseError::Conflict(message.into()),
            other => other,
        }
    }
}

impl From<SqlxError> for DatabaseError {
    fn from(err: SqlxError) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return DatabaseError::Conflict(constraint);
            }
        }

        match err {
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                DatabaseError::Connection(err)
            }
            other => DatabaseError::Query(other),
        }
    }
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_a_query_error() {
        let err = DatabaseError::from(SqlxError::RowNotFound);
        assert!(matches!(err, DatabaseError::Query(_)));
    }

    #[test]
    fn test_pool_timeout_is_a_connection_error() {
        let err = DatabaseError::from(SqlxError::PoolTimedOut);
        assert!(matches!(err, DatabaseError::Connection(_)));
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("tags[0].name", "This field may not be blank.");
        assert_eq!(err.to_string(), "tags[0].name: This field may not be blank.");
    }

    #[test]
    fn test_reject_null_characters() {
        assert!(reject_null_characters("title", "Soup").is_ok());

        let err = reject_null_characters("title", "So\0up").unwrap_err();
        assert_eq!(err.field, "title");
        assert_eq!(err.message, "Null characters are not allowed.");
    }

    #[test]
    fn test_with_conflict_message() {
        let err = DatabaseError::Conflict("tags_user_id_name_key".to_string())
            .with_conflict_message("tag with this name already exists");
        assert_eq!(err.to_string(), "Conflict: tag with this name already exists");

        let err = DatabaseError::Migration("boom".to_string()).with_conflict_message("ignored");
        assert_eq!(err.to_string(), "Database migration error: boom");
    }
}
