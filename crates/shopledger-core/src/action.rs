//! Action: one immutable entry of the ledger's history.
//!
//! Actions are never edited or removed. The balance is, by definition, the
//! fold of every action's cash effect in log order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A recorded balance- or inventory-affecting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Cash added to the balance. A negative amount is a withdrawal.
    Deposit { amount: f64 },

    /// Stock bought: inventory up, cash down.
    Purchase {
        product: String,
        price: f64,
        quantity: u64,
    },

    /// Stock sold: inventory down, cash up.
    Sale {
        product: String,
        price: f64,
        quantity: u64,
    },
}

impl Action {
    /// The discriminator of this action.
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Deposit { .. } => ActionKind::Deposit,
            Action::Purchase { .. } => ActionKind::Purchase,
            Action::Sale { .. } => ActionKind::Sale,
        }
    }

    /// Signed change this action makes to the cash balance.
    pub fn cash_effect(&self) -> f64 {
        match self {
            Action::Deposit { amount } => *amount,
            Action::Purchase {
                price, quantity, ..
            } => -trade_value(*price, *quantity),
            Action::Sale {
                price, quantity, ..
            } => trade_value(*price, *quantity),
        }
    }

    /// The product this action moves, if any.
    pub fn product(&self) -> Option<&str> {
        match self {
            Action::Deposit { .. } => None,
            Action::Purchase { product, .. } | Action::Sale { product, .. } => Some(product),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Deposit { amount } => write!(f, "deposit {:?}", amount),
            Action::Purchase {
                product,
                price,
                quantity,
            } => write!(f, "purchase {} x{} @ {:?}", product, quantity, price),
            Action::Sale {
                product,
                price,
                quantity,
            } => write!(f, "sale {} x{} @ {:?}", product, quantity, price),
        }
    }
}

/// Cash value of `quantity` units at `price`.
pub(crate) fn trade_value(price: f64, quantity: u64) -> f64 {
    price * quantity as f64
}

/// Discriminator for [`Action`], used as the tag in persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Deposit,
    Purchase,
    Sale,
}

impl ActionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Deposit => "deposit",
            ActionKind::Purchase => "purchase",
            ActionKind::Sale => "sale",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(ActionKind::Deposit),
            "purchase" => Ok(ActionKind::Purchase),
            "sale" => Ok(ActionKind::Sale),
            other => Err(format!("unknown action kind: {other}")),
        }
    }
}
