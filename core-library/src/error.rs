use bridge_traits::error::BridgeError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    /// A required field was empty or malformed.
    #[error("Invalid data: {field} - {message}")]
    InvalidData { field: String, message: String },

    /// A caller-supplied argument is unusable (e.g. a zero page size).
    #[error("Invalid argument: {field} - {message}")]
    InvalidArgument { field: String, message: String },

    #[error("Group not found: '{group}'")]
    GroupNotFound { group: String },

    #[error("Song not found: '{title}' by '{group}'")]
    SongNotFound { group: String, title: String },

    #[error("Page {page_index} out of bounds, page count is {page_count}")]
    PageOutOfBounds { page_index: u32, page_count: u32 },

    /// A statement that must yield exactly one row yielded none.
    #[error("Expected one row of output: {0}")]
    NoOutputRow(String),

    /// Uniqueness violation or write contention. Retrying may succeed.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Operation exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

impl LibraryError {
    pub fn invalid_data(field: impl Into<String>, message: impl Into<String>) -> Self {
        LibraryError::InvalidData {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        LibraryError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether an outer caller may re-run the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LibraryError::Conflict(_) | LibraryError::DeadlineExceeded(_)
        )
    }
}

impl From<BridgeError> for LibraryError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::ConstraintViolation(msg) | BridgeError::Busy(msg) => {
                LibraryError::Conflict(msg)
            }
            other => LibraryError::Storage(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for LibraryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                LibraryError::Conflict(db_err.message().to_string())
            }
            _ => LibraryError::Storage(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
