//! Error types for the Ledger.

use shopledger_core::{Action, CommandError, IntegrityError, RangeError};
use shopledger_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The command was rejected. Nothing changed.
    #[error("command rejected: {0}")]
    Command(#[from] CommandError),

    /// A history query asked for indices outside the log.
    #[error(transparent)]
    Range(#[from] RangeError),

    /// The stored balance disagrees with the action log.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The command was applied in memory but could not be saved.
    ///
    /// Memory and store diverge until the next successful save.
    #[error("applied `{action}` but could not persist it: {source}")]
    NotPersisted {
        action: Action,
        #[source]
        source: StoreError,
    },

    /// A thread panicked while holding the state lock.
    #[error("ledger state lock poisoned")]
    Poisoned,
}

impl LedgerError {
    /// The action that was applied despite the error, if any.
    pub fn applied_action(&self) -> Option<&Action> {
        match self {
            LedgerError::NotPersisted { action, .. } => Some(action),
            _ => None,
        }
    }
}

/// Result type for Ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
