//! The Ledger: one owned state, one store, one lock.
//!
//! Every mutation holds the state lock across validate, apply and save, so a
//! reader never observes a command that has been applied but not yet
//! offered to the store.

use std::sync::{Mutex, MutexGuard};

use shopledger_core::{
    audit, verify, Action, Command, IntegrityReport, LedgerState, ProductEntry, Query, Request,
    Snapshot,
};
use shopledger_store::Store;

use crate::error::{LedgerError, Result};
use crate::response::Response;

/// What to do when the store holds a state that cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptStatePolicy {
    /// Refuse to open.
    #[default]
    Fail,
    /// Log a warning and open with an empty ledger. The corrupt record is
    /// overwritten by the next successful save.
    StartEmpty,
}

/// Configuration for the Ledger.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Replay the action log when opening and report divergences.
    pub verify_on_open: bool,
    /// Refuse to open when the stored balance disagrees with the log.
    pub strict_integrity: bool,
    /// Handling of undecodable stored state.
    pub corrupt_state: CorruptStatePolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            verify_on_open: true,
            strict_integrity: false,
            corrupt_state: CorruptStatePolicy::Fail,
        }
    }
}

/// The main Ledger struct.
///
/// Provides a unified API for:
/// - Applying deposits, purchases and sales, persisting each one
/// - Answering balance, inventory and history queries
/// - Checking the stored state against the action log
pub struct Ledger<S: Store> {
    store: S,
    state: Mutex<LedgerState>,
    config: LedgerConfig,
    open_report: Option<IntegrityReport>,
}

impl<S: Store> Ledger<S> {
    /// Load the state from `store` and open a ledger over it.
    pub fn open(store: S, config: LedgerConfig) -> Result<Self> {
        let state = match store.load() {
            Ok(state) => state,
            Err(e) if e.is_corrupt_state() && config.corrupt_state == CorruptStatePolicy::StartEmpty => {
                tracing::warn!(store = %store.describe(), error = %e, "stored state is corrupt, starting empty");
                LedgerState::new()
            }
            Err(e) => return Err(e.into()),
        };

        let open_report = if config.verify_on_open {
            let report = audit(&state);
            report_integrity(&store.describe(), &report);
            if let (true, Some(err)) = (config.strict_integrity, &report.balance) {
                return Err(err.clone().into());
            }
            Some(report)
        } else {
            None
        };

        tracing::info!(
            store = %store.describe(),
            balance = state.balance(),
            products = state.inventory().len(),
            actions = state.actions().len(),
            "opened ledger"
        );

        Ok(Self {
            store,
            state: Mutex::new(state),
            config,
            open_report,
        })
    }

    /// Open with [`LedgerConfig::default`].
    pub fn open_default(store: S) -> Result<Self> {
        Self::open(store, LedgerConfig::default())
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>> {
        self.state.lock().map_err(|_| LedgerError::Poisoned)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Validate and apply a command, then save the new state.
    ///
    /// A rejected command changes nothing. A command that was applied but
    /// could not be saved stays applied and returns
    /// [`LedgerError::NotPersisted`].
    pub fn apply(&self, command: Command) -> Result<Action> {
        let mut state = self.lock()?;

        let action = match state.apply(command) {
            Ok(action) => action.clone(),
            Err(e) => {
                tracing::warn!(error = %e, "rejected command");
                return Err(e.into());
            }
        };

        if let Err(source) = self.store.save(&state) {
            tracing::error!(
                store = %self.store.describe(),
                action = %action,
                error = %source,
                "failed to persist ledger"
            );
            return Err(LedgerError::NotPersisted { action, source });
        }

        tracing::info!(action = %action, balance = state.balance(), "applied command");
        Ok(action)
    }

    /// Save the current state, e.g. to catch the store up after
    /// [`LedgerError::NotPersisted`].
    pub fn persist(&self) -> Result<()> {
        let state = self.lock()?;
        self.store.save(&state)?;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text protocol
    // ─────────────────────────────────────────────────────────────────────────

    /// Parse and run one protocol line.
    pub fn execute(&self, line: &str) -> Result<Response> {
        match Request::parse(line)? {
            Request::Mutate(command) => self.apply(command).map(Response::Applied),
            Request::Query(query) => self.query(query),
            Request::Quit => Ok(Response::Quit),
        }
    }

    /// Answer a read-only query.
    pub fn query(&self, query: Query) -> Result<Response> {
        let response = match query {
            Query::Balance => Response::Balance(self.balance()?),
            Query::List => Response::Inventory(self.inventory()?),
            Query::Product { name } => {
                let entry = self.product(&name)?;
                Response::Product { name, entry }
            }
            Query::History { start, end } => Response::History {
                first: start.unwrap_or(0).max(0) as usize,
                actions: self.history(start, end)?,
            },
            Query::Check => Response::Integrity(self.audit()?),
        };
        Ok(response)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn balance(&self) -> Result<f64> {
        Ok(self.lock()?.balance())
    }

    /// Look up one product. `None` if it was never purchased.
    pub fn product(&self, name: &str) -> Result<Option<ProductEntry>> {
        Ok(self.lock()?.product(name).copied())
    }

    /// All products in insertion order.
    pub fn inventory(&self) -> Result<Vec<(String, ProductEntry)>> {
        Ok(self.lock()?.list_inventory())
    }

    /// Inclusive slice of the action log, see [`LedgerState::history`].
    pub fn history(&self, start: Option<i64>, end: Option<i64>) -> Result<Vec<Action>> {
        Ok(self.lock()?.history(start, end)?.to_vec())
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.lock()?.snapshot())
    }

    /// A copy of the full state.
    pub fn state(&self) -> Result<LedgerState> {
        Ok(self.lock()?.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Integrity
    // ─────────────────────────────────────────────────────────────────────────

    /// Replay the log and compare with the stored balance.
    pub fn verify(&self) -> Result<()> {
        let state = self.lock()?;
        Ok(verify(&state)?)
    }

    /// Replay balance and stock movements.
    pub fn audit(&self) -> Result<IntegrityReport> {
        let state = self.lock()?;
        Ok(audit(&state))
    }

    /// The report computed while opening, if `verify_on_open` was set.
    pub fn open_report(&self) -> Option<&IntegrityReport> {
        self.open_report.as_ref()
    }
}

fn report_integrity(store: &str, report: &IntegrityReport) {
    if let Some(err) = &report.balance {
        tracing::warn!(
            store,
            stored = err.stored,
            computed = err.computed,
            "stored balance does not match the action log"
        );
    }
    for mismatch in &report.stock {
        tracing::warn!(
            store,
            product = %mismatch.product,
            stored = ?mismatch.stored,
            computed = mismatch.computed,
            "stored quantity does not match the action log"
        );
    }
}
