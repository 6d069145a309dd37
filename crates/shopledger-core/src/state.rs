//! LedgerState: balance, inventory and action log as one aggregate.
//!
//! The state is only mutated through [`LedgerState::apply`] (see
//! [`crate::processor`]). Loaders rebuild it with [`LedgerState::from_parts`],
//! which trusts its input; use [`crate::verify`] to check a loaded state.

use std::collections::HashMap;

use crate::action::Action;
use crate::types::ProductEntry;

/// Product inventory keyed by case-sensitive name.
///
/// Iteration follows insertion order, which keeps persisted output stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inventory {
    entries: Vec<(String, ProductEntry)>,
    index: HashMap<String, usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ProductEntry> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ProductEntry> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    /// Insert or replace an entry.
    ///
    /// A replaced entry keeps its original position. Returns the previous
    /// entry, if any.
    pub fn insert(&mut self, name: impl Into<String>, entry: ProductEntry) -> Option<ProductEntry> {
        let name = name.into();
        if let Some(&i) = self.index.get(&name) {
            return Some(std::mem::replace(&mut self.entries[i].1, entry));
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, entry));
        None
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

impl FromIterator<(String, ProductEntry)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (String, ProductEntry)>>(iter: I) -> Self {
        let mut inventory = Inventory::new();
        for (name, entry) in iter {
            inventory.insert(name, entry);
        }
        inventory
    }
}

/// The ledger aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerState {
    pub(crate) balance: f64,
    pub(crate) inventory: Inventory,
    pub(crate) actions: Vec<Action>,
}

impl LedgerState {
    /// A fresh ledger: zero balance, empty inventory, empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reassemble a state from persisted parts, without validation.
    pub fn from_parts(balance: f64, inventory: Inventory, actions: Vec<Action>) -> Self {
        Self {
            balance,
            inventory,
            actions,
        }
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// True for a state with nothing recorded yet.
    pub fn is_fresh(&self) -> bool {
        self.balance == 0.0 && self.inventory.is_empty() && self.actions.is_empty()
    }
}
