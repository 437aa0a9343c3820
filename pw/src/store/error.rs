//! Store error types

use thiserror::Error;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Username is already registered
    #[error("User '{username}' already exists")]
    UserExists { username: String },

    /// Referenced user does not exist
    #[error("User with ID {id} not found")]
    UserNotFound { id: i64 },

    /// File system operation errors
    #[error("File system error at path '{path}': {source}")]
    FileSystem {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    /// A previous holder of the connection lock panicked
    #[error("Database connection lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn database(message: &str, source: rusqlite::Error) -> Self {
        StoreError::Database {
            message: message.to_string(),
            source,
        }
    }

    /// Inserts referencing a missing user surface as foreign key violations
    pub(crate) fn from_owner_insert(user_id: i64, message: &str, source: rusqlite::Error) -> Self {
        match &source {
            rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
                StoreError::UserNotFound { id: user_id }
            }
            _ => StoreError::database(message, source),
        }
    }
}

/// Extension trait for database-related Results
pub trait DatabaseResultExt<T> {
    /// Map database errors with a message
    fn db_context(self, message: &str) -> Result<T>;
}

impl<T> DatabaseResultExt<T> for std::result::Result<T, rusqlite::Error> {
    fn db_context(self, message: &str) -> Result<T> {
        self.map_err(|e| StoreError::database(message, e))
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
