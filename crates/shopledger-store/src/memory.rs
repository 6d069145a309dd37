//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same load/save semantics as the
//! persistent stores but keeps the last saved state in memory only.

use std::sync::RwLock;

use shopledger_core::LedgerState;

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: RwLock<Option<LedgerState>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `state`, as if it had been saved.
    pub fn with_state(state: LedgerState) -> Self {
        Self {
            saved: RwLock::new(Some(state)),
        }
    }

    /// Number of the most recently saved actions, if anything was saved.
    pub fn saved_actions(&self) -> Result<Option<usize>> {
        let saved = self.saved.read().map_err(poisoned)?;
        Ok(saved.as_ref().map(|state| state.actions().len()))
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable(format!("memory store lock poisoned: {}", e))
}

impl Store for MemoryStore {
    fn load(&self) -> Result<LedgerState> {
        let saved = self.saved.read().map_err(poisoned)?;
        Ok(saved.clone().unwrap_or_default())
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        let mut saved = self.saved.write().map_err(poisoned)?;
        *saved = Some(state.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
