//! Answers to protocol lines, rendered for the interactive prompt.

use std::fmt;

use shopledger_core::{Action, IntegrityReport, ProductEntry};

/// The result of one successfully executed protocol line.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// A mutation was applied and saved.
    Applied(Action),
    Balance(f64),
    Inventory(Vec<(String, ProductEntry)>),
    Product {
        name: String,
        entry: Option<ProductEntry>,
    },
    /// A slice of the log. `first` is the log index of `actions[0]`.
    History { first: usize, actions: Vec<Action> },
    Integrity(IntegrityReport),
    Quit,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Applied(action) => write!(f, "recorded: {action}"),
            Response::Balance(balance) => write!(f, "balance: {balance:?}"),
            Response::Inventory(products) if products.is_empty() => f.write_str("inventory is empty"),
            Response::Inventory(products) => {
                let lines: Vec<String> = products
                    .iter()
                    .map(|(name, entry)| format!("{name}: {entry}"))
                    .collect();
                f.write_str(&lines.join("\n"))
            }
            Response::Product {
                name,
                entry: Some(entry),
            } => write!(f, "{name}: {entry}"),
            Response::Product { name, entry: None } => write!(f, "{name}: not in inventory"),
            Response::History { actions, .. } if actions.is_empty() => f.write_str("history is empty"),
            Response::History { first, actions } => {
                let lines: Vec<String> = actions
                    .iter()
                    .enumerate()
                    .map(|(i, action)| format!("{}: {action}", first + i))
                    .collect();
                f.write_str(&lines.join("\n"))
            }
            Response::Integrity(report) if report.is_clean() => {
                f.write_str("integrity ok: balance and stock match the history")
            }
            Response::Integrity(report) => {
                let mut lines = Vec::new();
                if let Some(err) = &report.balance {
                    lines.push(err.to_string());
                }
                for mismatch in &report.stock {
                    let stored = mismatch
                        .stored
                        .map_or_else(|| "missing".to_string(), |q| q.to_string());
                    lines.push(format!(
                        "stock mismatch for {}: stored {stored}, history says {}",
                        mismatch.product, mismatch.computed
                    ));
                }
                f.write_str(&lines.join("\n"))
            }
            Response::Quit => f.write_str("bye"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopledger_core::{IntegrityError, StockMismatch};

    #[test]
    fn test_render_inventory() {
        let response = Response::Inventory(vec![
            ("Widget".into(), ProductEntry::new(2.5, 15)),
            ("Gadget".into(), ProductEntry::new(1.0, 0)),
        ]);
        assert_eq!(
            response.to_string(),
            "Widget: price 2.5, quantity 15\nGadget: price 1.0, quantity 0"
        );
        assert_eq!(Response::Inventory(vec![]).to_string(), "inventory is empty");
    }

    #[test]
    fn test_render_history_indices() {
        let response = Response::History {
            first: 3,
            actions: vec![Action::Deposit { amount: 5.0 }, Action::Deposit { amount: -1.0 }],
        };
        assert_eq!(response.to_string(), "3: deposit 5.0\n4: deposit -1.0");
    }

    #[test]
    fn test_render_integrity_problems() {
        let report = IntegrityReport {
            balance: Some(IntegrityError {
                stored: 5.0,
                computed: 4.0,
            }),
            stock: vec![StockMismatch {
                product: "Widget".into(),
                stored: None,
                computed: 3,
            }],
        };
        let text = Response::Integrity(report).to_string();
        assert!(text.contains("stored balance 5 does not match computed balance 4"));
        assert!(text.contains("stock mismatch for Widget: stored missing, history says 3"));
    }
}
