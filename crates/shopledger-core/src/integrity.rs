//! Integrity Checker: recompute the ledger from its action log.
//!
//! The stored balance is redundant: it must equal the fold of every action's
//! cash effect, starting from zero, in log order. [`verify`] checks exactly
//! that, with exact float equality. Replaying uses the same operations in the
//! same order as [`LedgerState::apply`], so an untouched ledger always matches
//! bit for bit.
//!
//! [`audit`] extends the check to stock levels for operator reports.

use std::collections::HashMap;

use crate::action::Action;
use crate::error::IntegrityError;
use crate::state::LedgerState;

/// Fold the cash effect of `actions` starting from `0.0`.
pub fn replay_balance(actions: &[Action]) -> f64 {
    actions
        .iter()
        .fold(0.0, |balance, action| balance + action.cash_effect())
}

/// Compare the stored balance against the replayed balance.
pub fn verify(state: &LedgerState) -> Result<(), IntegrityError> {
    let computed = replay_balance(state.actions());
    let stored = state.balance();
    if stored != computed {
        return Err(IntegrityError { stored, computed });
    }
    Ok(())
}

/// A product whose stored quantity differs from the quantity replayed from
/// the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMismatch {
    pub product: String,
    /// Quantity held in the inventory, `None` if the product is missing.
    pub stored: Option<u64>,
    /// Purchases minus sales from the log. Negative means the log sells more
    /// than it ever bought.
    pub computed: i128,
}

/// Result of a full replay of the action log.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntegrityReport {
    /// Balance mismatch, if any.
    pub balance: Option<IntegrityError>,
    /// Stock mismatches in inventory order, then log-only products.
    pub stock: Vec<StockMismatch>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.balance.is_none() && self.stock.is_empty()
    }
}

/// Replay balance and stock movements and report every divergence.
pub fn audit(state: &LedgerState) -> IntegrityReport {
    let balance = verify(state).err();

    let mut replayed: HashMap<&str, i128> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    for action in state.actions() {
        let (product, delta) = match action {
            Action::Deposit { .. } => continue,
            Action::Purchase {
                product, quantity, ..
            } => (product.as_str(), i128::from(*quantity)),
            Action::Sale {
                product, quantity, ..
            } => (product.as_str(), -i128::from(*quantity)),
        };
        let slot = replayed.entry(product).or_insert_with(|| {
            first_seen.push(product);
            0
        });
        *slot += delta;
    }

    let mut stock = Vec::new();
    for (name, entry) in state.inventory().iter() {
        let computed = replayed.get(name).copied().unwrap_or(0);
        if computed != i128::from(entry.quantity) {
            stock.push(StockMismatch {
                product: name.to_string(),
                stored: Some(entry.quantity),
                computed,
            });
        }
    }
    for name in first_seen {
        if !state.inventory().contains(name) {
            stock.push(StockMismatch {
                product: name.to_string(),
                stored: None,
                computed: replayed[name],
            });
        }
    }

    IntegrityReport { balance, stock }
}
