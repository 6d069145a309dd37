//! Error types for the Shop Ledger Core.

use thiserror::Error;

/// Rejections produced while parsing or applying a command.
///
/// Every variant is raised before any mutation, so a rejected command leaves
/// the balance, the inventory and the action log untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u64,
        available: u64,
    },
}

impl CommandError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        CommandError::InvalidCommand(reason.into())
    }
}

/// A history range that does not fit the action log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid history range {start}..={end}: available indices are 0..{len}")]
pub struct RangeError {
    pub start: i64,
    pub end: i64,
    pub len: usize,
}

/// The stored balance disagrees with the balance replayed from the log.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("integrity error: stored balance {stored} does not match computed balance {computed}")]
pub struct IntegrityError {
    pub stored: f64,
    pub computed: f64,
}
