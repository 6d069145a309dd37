//! Store trait: the load/save contract every persistence adapter implements.
//!
//! The ledger is small and persistence is synchronous, so the contract is a
//! whole-state overwrite rather than incremental appends.

use shopledger_core::LedgerState;

use crate::error::Result;

/// The Store trait: load and save the full ledger state.
///
/// # Design Notes
///
/// - **Fresh on missing**: a backing store that does not exist yet loads as
///   [`LedgerState::new`], never as an error.
/// - **No fabrication**: any record that does not parse fails the whole load
///   with [`crate::StoreError::CorruptState`]. Records are never skipped.
/// - **Deterministic order**: inventory in insertion order, actions in log
///   order, so `load(save(s)) == s`.
pub trait Store: Send + Sync {
    /// Load the persisted state, or a fresh state if nothing was stored.
    fn load(&self) -> Result<LedgerState>;

    /// Overwrite the persisted state with `state`.
    fn save(&self, state: &LedgerState) -> Result<()>;

    /// Human-readable name of the backing store, for logs.
    fn describe(&self) -> String;
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn load(&self) -> Result<LedgerState> {
        (**self).load()
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        (**self).save(state)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn load(&self) -> Result<LedgerState> {
        (**self).load()
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        (**self).save(state)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
