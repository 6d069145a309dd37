//! # Shop Ledger Store
//!
//! Persistence for the Shop Ledger. Provides a trait-based interface for
//! loading and saving the whole [`LedgerState`](shopledger_core::LedgerState)
//! with flat-file, SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The load/save contract for all backends
//! - [`FileStore`] - Line-oriented text file, replaced atomically on save
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shopledger_core::{Command, LedgerState};
//! use shopledger_store::{FileStore, Store};
//!
//! let store = FileStore::new("ledger.txt");
//! let mut state = store.load().unwrap();
//! state.apply(Command::deposit(100.0)).unwrap();
//! store.save(&state).unwrap();
//! ```
//!
//! ## Design Notes
//!
//! - **Missing is fresh**: a store with nothing saved loads an empty ledger
//! - **Strict decoding**: a malformed record fails the load with
//!   [`StoreError::CorruptState`] and its location
//! - **Exact round trip**: floats are stored without loss, so the integrity
//!   check holds across restarts

pub mod error;
pub mod file;
pub mod memory;
pub mod schema;
pub mod sqlite;
pub mod text;
pub mod traits;

pub use error::{Result, StoreError};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
