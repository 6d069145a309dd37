//! # Shop Ledger Testkit
//!
//! Testing utilities for the Shop Ledger.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Ledgers and states set up for common scenarios
//! - **Generators**: Proptest strategies for commands and protocol lines
//! - **FlakyStore**: A store wrapper whose saves fail on demand
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use shopledger_testkit::generators::commands;
//!
//! proptest! {
//!     #[test]
//!     fn balance_always_replays(cmds in commands(50)) {
//!         let mut state = shopledger_core::LedgerState::new();
//!         for cmd in cmds {
//!             let _ = state.apply(cmd);
//!             prop_assert!(shopledger_core::verify(&state).is_ok());
//!         }
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use shopledger_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::stocked();
//! assert_eq!(fixture.ledger.balance().unwrap(), 75.0);
//! ```

pub mod fixtures;
pub mod flaky;
pub mod generators;

pub use fixtures::{sample_state, tampered, temp_path, TestFixture};
pub use flaky::FlakyStore;
pub use generators::{command, commands, protocol_line};
