//! # Shop Ledger Core
//!
//! Pure primitives for the Shop Ledger: the cash balance, the product
//! inventory, and the append-only action log that explains both.
//!
//! This crate contains no I/O, no storage, no logging. It is pure computation
//! over the ledger state.
//!
//! ## Key Types
//!
//! - [`LedgerState`] - Balance, inventory and action log as one aggregate
//! - [`Action`] - One immutable entry of the action log
//! - [`Command`] - A validated mutation request (deposit, purchase, sale)
//! - [`Request`] - A parsed line of the text protocol
//!
//! ## Integrity
//!
//! The stored balance is redundant with the log. [`verify`] replays the log
//! and reports any divergence. See the [`integrity`] module.
//!
//! ## Usage
//!
//! ```rust
//! use shopledger_core::{verify, Command, LedgerState};
//!
//! let mut state = LedgerState::new();
//! state.apply(Command::deposit(100.0)).unwrap();
//! state.apply(Command::purchase("Widget", 2.5, 10)).unwrap();
//!
//! assert_eq!(state.balance(), 75.0);
//! assert!(verify(&state).is_ok());
//! ```

pub mod action;
pub mod command;
pub mod error;
pub mod integrity;
pub mod processor;
pub mod query;
pub mod state;
pub mod types;

pub use action::{Action, ActionKind};
pub use command::{Command, Query, Request};
pub use error::{CommandError, IntegrityError, RangeError};
pub use integrity::{audit, replay_balance, verify, IntegrityReport, StockMismatch};
pub use query::Snapshot;
pub use state::{Inventory, LedgerState};
pub use types::{ProductEntry, MAX_QUANTITY};
