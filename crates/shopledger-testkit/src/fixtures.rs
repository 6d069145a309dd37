//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::path::PathBuf;

use shopledger::{Ledger, LedgerConfig, Response};
use shopledger_core::{Command, LedgerState};
use shopledger_store::MemoryStore;

/// A ledger over an in-memory store.
pub struct TestFixture {
    pub ledger: Ledger<MemoryStore>,
}

impl TestFixture {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::from_state(LedgerState::new())
    }

    /// Ledger holding [`sample_state`].
    pub fn stocked() -> Self {
        Self::from_state(sample_state())
    }

    /// Ledger whose store already holds `state`.
    pub fn from_state(state: LedgerState) -> Self {
        let ledger = Ledger::open(MemoryStore::with_state(state), LedgerConfig::default())
            .expect("memory store always opens");
        Self { ledger }
    }

    /// Execute protocol lines, panicking on the first error.
    pub fn run(&self, lines: &[&str]) -> Vec<Response> {
        lines
            .iter()
            .map(|line| {
                self.ledger
                    .execute(line)
                    .unwrap_or_else(|e| panic!("`{line}` failed: {e}"))
            })
            .collect()
    }

    /// The state as last saved to the store.
    pub fn saved_state(&self) -> LedgerState {
        use shopledger_store::Store;
        self.ledger.store().load().expect("memory store always loads")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deposit 100, then buy 10 Widgets at 2.50: balance 75, one product.
pub fn sample_state() -> LedgerState {
    let mut state = LedgerState::new();
    state
        .apply(Command::deposit(100.0))
        .expect("deposit is always valid");
    state
        .apply(Command::purchase("Widget", 2.5, 10))
        .expect("purchase is always valid");
    state
}

/// `state` with its stored balance replaced, leaving the log untouched.
pub fn tampered(state: &LedgerState, balance: f64) -> LedgerState {
    LedgerState::from_parts(balance, state.inventory().clone(), state.actions().to_vec())
}

/// A fresh temporary directory and a path inside it.
pub fn temp_path(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    (dir, path)
}
