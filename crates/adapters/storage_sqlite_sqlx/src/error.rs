//! Storage-specific error type wrapping sqlx errors.

use badger_domain::error::BadgerError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request names a command that is not configured.
    #[error("SQL command not found: {0}")]
    UnknownCommand(String),

    /// The request resolved to an empty statement.
    #[error("SQL command not found or query is empty")]
    EmptyQuery,

    /// `function` and `procedure` have no `SQLite` equivalent.
    #[error("sqlite does not support '{0}' operations")]
    Unsupported(&'static str),

    /// None of the operation keys `SQLite` understands is present.
    #[error("sqlite action requires 'command' or 'query'")]
    MissingOperation,
}

impl From<StorageError> for BadgerError {
    fn from(err: StorageError) -> Self {
        Self::Database(Box::new(err))
    }
}
