//! Common error types for SWIMREC

use thiserror::Error;

/// Common result type for SWIMREC operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across SWIMREC crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the wrapped database error is a UNIQUE constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }

    /// True for failures that may succeed when retried (lock contention, pool exhaustion, I/O)
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                let message = db_err.message().to_ascii_lowercase();
                message.contains("database is locked") || message.contains("busy")
            }
            Error::Database(sqlx::Error::PoolTimedOut) => true,
            Error::Database(sqlx::Error::Io(_)) => true,
            Error::Io(_) => true,
            _ => false,
        }
    }

    /// True when storage can no longer be reached at all (not a per-row condition)
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Database(sqlx::Error::PoolClosed))
    }
}
