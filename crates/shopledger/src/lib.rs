//! # Shop Ledger
//!
//! A small shop's books: a cash balance, a product inventory, and an
//! append-only history of deposits, purchases and sales that explains both.
//!
//! ## Overview
//!
//! - **Commands** change the ledger and are saved immediately
//! - **Queries** read balance, inventory and history
//! - **Integrity** replays the history and compares it with the stored state
//!
//! ## Usage
//!
//! ```rust
//! use shopledger::{Ledger, LedgerConfig, Response};
//! use shopledger::store::MemoryStore;
//!
//! let ledger = Ledger::open(MemoryStore::new(), LedgerConfig::default()).unwrap();
//!
//! ledger.execute("deposit,100").unwrap();
//! ledger.execute("purchase,Widget,2.50,10").unwrap();
//!
//! assert_eq!(ledger.execute("balance").unwrap(), Response::Balance(75.0));
//! assert!(ledger.verify().is_ok());
//! ```
//!
//! ## Re-exports
//!
//! - `shopledger::core` - Ledger state, commands, integrity and queries
//! - `shopledger::store` - Store trait with file, SQLite and memory backends

pub mod error;
pub mod ledger;
pub mod response;

pub use shopledger_core as core;
pub use shopledger_store as store;

pub use error::{LedgerError, Result};
pub use ledger::{CorruptStatePolicy, Ledger, LedgerConfig};
pub use response::Response;

pub use shopledger_core::{Action, Command, IntegrityReport, ProductEntry, Snapshot};
