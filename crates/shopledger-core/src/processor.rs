//! Command Processor: validates a command and applies it to the state.
//!
//! Validation runs to completion before the first mutation. A command that
//! passes [`LedgerState::validate`] cannot fail afterwards, so balance,
//! inventory and log always move together.

use crate::action::{trade_value, Action};
use crate::command::{check_name, Command};
use crate::error::CommandError;
use crate::state::LedgerState;
use crate::types::{ProductEntry, MAX_QUANTITY};

impl LedgerState {
    /// Check a command against the current state without mutating it.
    ///
    /// This performs:
    /// - Numbers: amount and price must be finite, and so must the new balance
    /// - Names: non-empty, no control characters
    /// - Sale: product must exist and hold at least `quantity` units
    /// - Quantities: at most [`MAX_QUANTITY`], for the command and for the
    ///   accumulated stock after a purchase
    pub fn validate(&self, command: &Command) -> Result<(), CommandError> {
        let effect = match command {
            Command::Deposit { amount } => {
                check_finite("amount", *amount)?;
                *amount
            }
            Command::Purchase {
                name,
                price,
                quantity,
            } => {
                check_name(name)?;
                check_finite("price", *price)?;
                check_quantity(*quantity)?;
                if let Some(entry) = self.inventory.get(name) {
                    let total = entry.quantity.checked_add(*quantity);
                    if total.map_or(true, |total| total > MAX_QUANTITY) {
                        return Err(CommandError::invalid(format!(
                            "quantity overflow for {name}"
                        )));
                    }
                }
                -trade_value(*price, *quantity)
            }
            Command::Sale {
                name,
                price,
                quantity,
            } => {
                check_finite("price", *price)?;
                check_quantity(*quantity)?;
                let entry = self
                    .inventory
                    .get(name)
                    .ok_or_else(|| CommandError::UnknownProduct(name.clone()))?;
                if entry.quantity < *quantity {
                    return Err(CommandError::InsufficientStock {
                        product: name.clone(),
                        requested: *quantity,
                        available: entry.quantity,
                    });
                }
                trade_value(*price, *quantity)
            }
        };

        if !(self.balance + effect).is_finite() {
            return Err(CommandError::invalid("balance would overflow"));
        }
        Ok(())
    }

    /// Apply a command and append the resulting action to the log.
    ///
    /// Returns the appended action. On error nothing is changed.
    pub fn apply(&mut self, command: Command) -> Result<&Action, CommandError> {
        self.validate(&command)?;

        let action = match command {
            Command::Deposit { amount } => Action::Deposit { amount },
            Command::Purchase {
                name,
                price,
                quantity,
            } => {
                // An existing entry keeps the price it was first bought at;
                // only the quantity accumulates. This mirrors how the shop has
                // always recorded restocks, even though it may be unintended.
                match self.inventory.get_mut(&name) {
                    Some(entry) => entry.quantity += quantity,
                    None => {
                        self.inventory
                            .insert(name.clone(), ProductEntry::new(price, quantity));
                    }
                }
                Action::Purchase {
                    product: name,
                    price,
                    quantity,
                }
            }
            Command::Sale {
                name,
                price,
                quantity,
            } => {
                if let Some(entry) = self.inventory.get_mut(&name) {
                    entry.quantity -= quantity;
                }
                Action::Sale {
                    product: name,
                    price,
                    quantity,
                }
            }
        };

        self.balance += action.cash_effect();
        self.actions.push(action);
        Ok(&self.actions[self.actions.len() - 1])
    }
}

fn check_finite(what: &str, value: f64) -> Result<(), CommandError> {
    if !value.is_finite() {
        return Err(CommandError::invalid(format!("{what} is not a finite number")));
    }
    Ok(())
}

fn check_quantity(quantity: u64) -> Result<(), CommandError> {
    if quantity > MAX_QUANTITY {
        return Err(CommandError::invalid(format!(
            "quantity {quantity} exceeds {MAX_QUANTITY}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Request;
    use crate::integrity::verify;

    fn stocked(name: &str, quantity: u64) -> LedgerState {
        let mut state = LedgerState::new();
        state.apply(Command::purchase(name, 1.0, quantity)).unwrap();
        state
    }

    #[test]
    fn test_deposit_accepts_any_sign() {
        let mut state = LedgerState::new();
        state.apply(Command::deposit(100.0)).unwrap();
        state.apply(Command::deposit(-30.0)).unwrap();

        assert_eq!(state.balance(), 70.0);
        assert_eq!(state.actions().len(), 2);
    }

    #[test]
    fn test_purchase_accumulates_quantity() {
        let mut state = LedgerState::new();
        state.apply(Command::purchase("Widget", 2.50, 10)).unwrap();
        state.apply(Command::purchase("Widget", 2.50, 5)).unwrap();

        assert_eq!(state.product("Widget").unwrap().quantity, 15);
        assert_eq!(state.balance(), -37.50);
        let purchases = state
            .actions()
            .iter()
            .filter(|a| matches!(a, Action::Purchase { .. }))
            .count();
        assert_eq!(purchases, 2);
    }

    #[test]
    fn test_purchase_keeps_original_price() {
        let mut state = LedgerState::new();
        state.apply(Command::purchase("Widget", 2.0, 1)).unwrap();
        state.apply(Command::purchase("Widget", 3.0, 1)).unwrap();

        assert_eq!(state.product("Widget").unwrap().price, 2.0);
        // The cash effect still uses the price given with each purchase.
        assert_eq!(state.balance(), -5.0);
    }

    #[test]
    fn test_sale_moves_stock_and_cash() {
        let mut state = stocked("Widget", 5);
        let action = state.apply(Command::sale("Widget", 4.0, 2)).unwrap().clone();

        assert_eq!(
            action,
            Action::Sale {
                product: "Widget".into(),
                price: 4.0,
                quantity: 2
            }
        );
        assert_eq!(state.product("Widget").unwrap().quantity, 3);
        assert_eq!(state.balance(), -5.0 + 8.0);
    }

    #[test]
    fn test_sale_insufficient_stock_is_side_effect_free() {
        let mut state = stocked("Widget", 5);
        let before = state.clone();

        let err = state.apply(Command::sale("Widget", 4.0, 6)).unwrap_err();
        assert_eq!(
            err,
            CommandError::InsufficientStock {
                product: "Widget".into(),
                requested: 6,
                available: 5
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_sale_unknown_product() {
        let mut state = stocked("Widget", 5);
        let err = state.apply(Command::sale("Gadget", 1.0, 1)).unwrap_err();

        assert_eq!(err, CommandError::UnknownProduct("Gadget".into()));
        assert_eq!(state.actions().len(), 1);
    }

    #[test]
    fn test_sale_of_entire_stock() {
        let mut state = stocked("Widget", 5);
        state.apply(Command::sale("Widget", 1.0, 5)).unwrap();

        assert_eq!(state.product("Widget").unwrap().quantity, 0);
        assert!(state.apply(Command::sale("Widget", 1.0, 1)).is_err());
    }

    #[test]
    fn test_purchase_overflow_rejected() {
        let mut state = stocked("Widget", MAX_QUANTITY);
        let before = state.clone();

        let err = state.apply(Command::purchase("Widget", 1.0, 1)).unwrap_err();
        assert!(matches!(err, CommandError::InvalidCommand(_)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_quantity_above_limit_rejected() {
        let mut state = stocked("Widget", 5);
        let before = state.clone();

        for command in [
            Command::purchase("Gadget", 0.0, MAX_QUANTITY + 1),
            Command::purchase("Widget", 0.0, u64::MAX),
            Command::sale("Widget", 1.0, MAX_QUANTITY + 1),
        ] {
            assert!(
                matches!(state.apply(command.clone()), Err(CommandError::InvalidCommand(_))),
                "expected InvalidCommand for {command:?}"
            );
        }
        assert_eq!(state, before);

        let mut state = LedgerState::new();
        state.apply(Command::purchase("Gadget", 0.0, MAX_QUANTITY)).unwrap();
        assert_eq!(state.product("Gadget").unwrap().quantity, MAX_QUANTITY);
    }

    #[test]
    fn test_parsed_oversized_purchase_rejected() {
        let mut state = LedgerState::new();
        let Request::Mutate(command) = Request::parse("purchase,Widget,0,9223372036854775808").unwrap() else {
            panic!("expected a command");
        };

        assert!(matches!(state.apply(command), Err(CommandError::InvalidCommand(_))));
        assert!(state.is_fresh());
    }

    #[test]
    fn test_typed_commands_are_validated() {
        let mut state = LedgerState::new();
        let rejected = [
            Command::deposit(f64::NAN),
            Command::purchase("", 1.0, 1),
            Command::purchase("Wid\nget", 1.0, 1),
            Command::purchase("Widget", f64::INFINITY, 1),
            Command::purchase("Widget", f64::MAX, 10),
        ];
        for command in rejected {
            assert!(
                matches!(state.apply(command.clone()), Err(CommandError::InvalidCommand(_))),
                "expected InvalidCommand for {command:?}"
            );
        }
        assert!(state.is_fresh());
    }

    #[test]
    fn test_mixed_sequence_verifies() {
        let mut state = LedgerState::new();
        state.apply(Command::deposit(0.1)).unwrap();
        state.apply(Command::purchase("Widget", 0.2, 3)).unwrap();
        state.apply(Command::sale("Widget", 0.7, 2)).unwrap();
        state.apply(Command::deposit(-0.3)).unwrap();

        assert!(verify(&state).is_ok());
    }
}
