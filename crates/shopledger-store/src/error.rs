//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record could not be parsed.
    ///
    /// `location` names the line or row, e.g. `line 4` or `actions row 2`.
    #[error("corrupt state at {location}: {reason}")]
    CorruptState { location: String, reason: String },

    /// Record encoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store failed on purpose or is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn corrupt(location: impl Into<String>, reason: impl Into<String>) -> Self {
        StoreError::CorruptState {
            location: location.into(),
            reason: reason.into(),
        }
    }

    pub fn is_corrupt_state(&self) -> bool {
        matches!(self, StoreError::CorruptState { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
