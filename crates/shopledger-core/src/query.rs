//! Query Facade: read-only projections of the ledger.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::RangeError;
use crate::state::LedgerState;
use crate::types::ProductEntry;

/// Balance and inventory at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub balance: f64,
    pub inventory: Vec<(String, ProductEntry)>,
}

impl LedgerState {
    /// Current cash balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Look up one product.
    pub fn product(&self, name: &str) -> Option<&ProductEntry> {
        self.inventory.get(name)
    }

    /// All products in insertion order.
    pub fn list_inventory(&self) -> Vec<(String, ProductEntry)> {
        self.inventory
            .iter()
            .map(|(name, entry)| (name.to_string(), *entry))
            .collect()
    }

    /// Inclusive slice `start..=end` of the action log.
    ///
    /// `start` defaults to 0 and `end` to the last index. Without either
    /// bound the whole log is returned, even when it is empty.
    pub fn history(&self, start: Option<i64>, end: Option<i64>) -> Result<&[Action], RangeError> {
        let len = self.actions.len();
        if start.is_none() && end.is_none() {
            return Ok(&self.actions);
        }

        let start = start.unwrap_or(0);
        let end = end.unwrap_or(len as i64 - 1);
        if start < 0 || end >= len as i64 || start > end {
            return Err(RangeError { start, end, len });
        }

        Ok(&self.actions[start as usize..=end as usize])
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            balance: self.balance,
            inventory: self.list_inventory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    fn state_with(n: usize) -> LedgerState {
        let mut state = LedgerState::new();
        for i in 0..n {
            state.apply(Command::deposit(i as f64)).unwrap();
        }
        state
    }

    #[test]
    fn test_history_defaults() {
        let state = state_with(4);
        assert_eq!(state.history(None, None).unwrap().len(), 4);
        assert_eq!(state.history(Some(2), None).unwrap().len(), 2);
        assert_eq!(state.history(None, Some(0)).unwrap().len(), 1);
    }

    #[test]
    fn test_history_inclusive_slice() {
        let state = state_with(5);
        let slice = state.history(Some(1), Some(3)).unwrap();
        assert_eq!(
            slice,
            &[
                Action::Deposit { amount: 1.0 },
                Action::Deposit { amount: 2.0 },
                Action::Deposit { amount: 3.0 },
            ]
        );
    }

    #[test]
    fn test_history_inverted_range() {
        let state = state_with(2);
        let err = state.history(Some(2), Some(1)).unwrap_err();
        assert_eq!(
            err,
            RangeError {
                start: 2,
                end: 1,
                len: 2
            }
        );
    }

    #[test]
    fn test_history_out_of_bounds() {
        let state = state_with(3);
        assert!(state.history(Some(-1), Some(1)).is_err());
        assert!(state.history(Some(0), Some(3)).is_err());
        assert!(state.history(Some(3), None).is_err());
    }

    #[test]
    fn test_history_empty_log() {
        let state = LedgerState::new();
        assert!(state.history(None, None).unwrap().is_empty());
        assert!(state.history(Some(0), None).is_err());
    }

    #[test]
    fn test_product_and_inventory() {
        let mut state = LedgerState::new();
        state.apply(Command::purchase("B", 1.0, 1)).unwrap();
        state.apply(Command::purchase("A", 2.0, 2)).unwrap();

        assert_eq!(state.product("A"), Some(&ProductEntry::new(2.0, 2)));
        assert_eq!(state.product("C"), None);
        assert_eq!(
            state.list_inventory(),
            vec![
                ("B".to_string(), ProductEntry::new(1.0, 1)),
                ("A".to_string(), ProductEntry::new(2.0, 2)),
            ]
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut state = LedgerState::new();
        state.apply(Command::purchase("Widget", 2.5, 4)).unwrap();

        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["balance"], -10.0);
        assert_eq!(json["inventory"][0][0], "Widget");
        assert_eq!(json["inventory"][0][1]["quantity"], 4);
    }
}
