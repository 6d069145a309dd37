//! A store whose saves can be made to fail.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use shopledger_core::LedgerState;
use shopledger_store::{Result, Store, StoreError};

/// Wraps another store and fails `save` while switched off.
#[derive(Debug, Default)]
pub struct FlakyStore<S> {
    inner: S,
    failing: AtomicBool,
    attempts: AtomicUsize,
}

impl<S: Store> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            failing: AtomicBool::new(false),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Make subsequent saves fail (`true`) or pass through (`false`).
    pub fn fail_saves(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `save` calls, failed ones included.
    pub fn save_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> Store for FlakyStore<S> {
    fn load(&self) -> Result<LedgerState> {
        self.inner.load()
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("save disabled".to_string()));
        }
        self.inner.save(state)
    }

    fn describe(&self) -> String {
        format!("flaky({})", self.inner.describe())
    }
}
