//! Line-oriented text encoding of the ledger state.
//!
//! ```text
//! Balance: 62.5
//! Inventory:
//! Product: Widget, Price: 2.5, Quantity: 15
//! History:
//! ["deposit",100.0]
//! ["purchase","Widget",2.5,15]
//! ```
//!
//! Floats are written in their shortest round-trip form, so decoding an
//! encoded state reproduces it exactly. History lines are JSON arrays whose
//! first element names the action kind. They are decoded by matching that
//! tag against the three known shapes, never by evaluating the line.

use serde_json::{json, Value};

use shopledger_core::{Action, ActionKind, Inventory, LedgerState, ProductEntry, MAX_QUANTITY};

use crate::error::{Result, StoreError};

const BALANCE_PREFIX: &str = "Balance: ";
const INVENTORY_HEADER: &str = "Inventory:";
const PRODUCT_PREFIX: &str = "Product: ";
const PRICE_SEPARATOR: &str = ", Price: ";
const QUANTITY_SEPARATOR: &str = ", Quantity: ";
const HISTORY_HEADER: &str = "History:";

/// Encode the full state as text, one record per line.
pub fn encode(state: &LedgerState) -> String {
    let mut out = String::new();
    out.push_str(&format!("{BALANCE_PREFIX}{:?}\n", state.balance()));

    out.push_str(INVENTORY_HEADER);
    out.push('\n');
    for (name, entry) in state.inventory().iter() {
        out.push_str(&format!(
            "{PRODUCT_PREFIX}{name}{PRICE_SEPARATOR}{:?}{QUANTITY_SEPARATOR}{}\n",
            entry.price, entry.quantity
        ));
    }

    out.push_str(HISTORY_HEADER);
    out.push('\n');
    for action in state.actions() {
        out.push_str(&encode_action(action).to_string());
        out.push('\n');
    }

    out
}

/// Encode one action as a tagged tuple.
pub fn encode_action(action: &Action) -> Value {
    match action {
        Action::Deposit { amount } => json!([ActionKind::Deposit.as_str(), amount]),
        Action::Purchase {
            product,
            price,
            quantity,
        } => json!([ActionKind::Purchase.as_str(), product, price, quantity]),
        Action::Sale {
            product,
            price,
            quantity,
        } => json!([ActionKind::Sale.as_str(), product, price, quantity]),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    Inventory,
    History,
}

/// Decode a state produced by [`encode`].
///
/// Any line that does not parse fails the whole decode with
/// [`StoreError::CorruptState`] naming the 1-based line number.
pub fn decode(text: &str) -> Result<LedgerState> {
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line));

    let (number, first) = lines
        .next()
        .ok_or_else(|| StoreError::corrupt("line 1", "missing balance header"))?;
    let balance = first
        .strip_prefix(BALANCE_PREFIX)
        .ok_or_else(|| corrupt_line(number, "expected `Balance: <number>`"))
        .and_then(|raw| parse_float(number, "balance", raw))?;

    match lines.next() {
        Some((_, INVENTORY_HEADER)) => {}
        Some((number, _)) => return Err(corrupt_line(number, "expected `Inventory:` header")),
        None => return Err(StoreError::corrupt("end of file", "missing `Inventory:` section")),
    }

    let mut section = Section::Inventory;
    let mut inventory = Inventory::new();
    let mut actions = Vec::new();

    for (number, line) in lines {
        match section {
            Section::Inventory if line == HISTORY_HEADER => section = Section::History,
            Section::Inventory => {
                let (name, entry) = decode_product(number, line)?;
                if inventory.contains(&name) {
                    return Err(corrupt_line(number, format!("duplicate product {name:?}")));
                }
                inventory.insert(name, entry);
            }
            Section::History => actions.push(decode_action_line(number, line)?),
        }
    }

    if section != Section::History {
        return Err(StoreError::corrupt("end of file", "missing `History:` section"));
    }

    Ok(LedgerState::from_parts(balance, inventory, actions))
}

fn decode_product(number: usize, line: &str) -> Result<(String, ProductEntry)> {
    let rest = line
        .strip_prefix(PRODUCT_PREFIX)
        .ok_or_else(|| corrupt_line(number, "expected `Product: ...` line"))?;
    // Split from the right so the name may contain the separators.
    let (rest, quantity) = rest
        .rsplit_once(QUANTITY_SEPARATOR)
        .ok_or_else(|| corrupt_line(number, "missing quantity"))?;
    let (name, price) = rest
        .rsplit_once(PRICE_SEPARATOR)
        .ok_or_else(|| corrupt_line(number, "missing price"))?;

    if name.is_empty() {
        return Err(corrupt_line(number, "empty product name"));
    }
    let price = parse_float(number, "price", price)?;
    let quantity = quantity
        .parse::<u64>()
        .ok()
        .filter(|&q| q <= MAX_QUANTITY)
        .ok_or_else(|| corrupt_line(number, format!("invalid quantity {quantity:?}")))?;

    Ok((name.to_string(), ProductEntry::new(price, quantity)))
}

fn decode_action_line(number: usize, line: &str) -> Result<Action> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| corrupt_line(number, format!("history entry is not a tuple: {e}")))?;
    decode_action(&value).map_err(|reason| corrupt_line(number, reason))
}

/// Decode a tagged tuple produced by [`encode_action`].
pub fn decode_action(value: &Value) -> std::result::Result<Action, String> {
    let fields = value
        .as_array()
        .ok_or_else(|| "history entry is not a tuple".to_string())?;
    let kind: ActionKind = fields
        .first()
        .and_then(Value::as_str)
        .ok_or_else(|| "history entry has no kind tag".to_string())?
        .parse()?;

    match (kind, fields.as_slice()) {
        (ActionKind::Deposit, [_, amount]) => Ok(Action::Deposit {
            amount: tuple_float("amount", amount)?,
        }),
        (ActionKind::Purchase, [_, product, price, quantity]) => Ok(Action::Purchase {
            product: tuple_name(product)?,
            price: tuple_float("price", price)?,
            quantity: tuple_quantity(quantity)?,
        }),
        (ActionKind::Sale, [_, product, price, quantity]) => Ok(Action::Sale {
            product: tuple_name(product)?,
            price: tuple_float("price", price)?,
            quantity: tuple_quantity(quantity)?,
        }),
        (kind, fields) => Err(format!("{kind} entry has {} fields", fields.len())),
    }
}

fn tuple_float(what: &str, value: &Value) -> std::result::Result<f64, String> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{what} is not a number: {value}"))
}

fn tuple_name(value: &Value) -> std::result::Result<String, String> {
    match value.as_str() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(format!("invalid product name: {value}")),
    }
}

fn tuple_quantity(value: &Value) -> std::result::Result<u64, String> {
    value
        .as_u64()
        .filter(|&q| q <= MAX_QUANTITY)
        .ok_or_else(|| format!("quantity is not an integer in 0..={MAX_QUANTITY}: {value}"))
}

fn parse_float(number: usize, what: &str, raw: &str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(corrupt_line(number, format!("invalid {what} {raw:?}"))),
    }
}

fn corrupt_line(number: usize, reason: impl Into<String>) -> StoreError {
    StoreError::corrupt(format!("line {number}"), reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shopledger_core::Command;

    fn sample_state() -> LedgerState {
        let mut state = LedgerState::new();
        state.apply(Command::deposit(100.0)).unwrap();
        state.apply(Command::purchase("Widget", 2.5, 10)).unwrap();
        state.apply(Command::purchase("Gadget, large", 0.5, 3)).unwrap();
        state.apply(Command::sale("Widget", 4.0, 3)).unwrap();
        state
    }

    #[test]
    fn test_encode_layout() {
        let text = encode(&sample_state());
        let expected = "\
Balance: 85.5
Inventory:
Product: Widget, Price: 2.5, Quantity: 7
Product: Gadget, large, Price: 0.5, Quantity: 3
History:
[\"deposit\",100.0]
[\"purchase\",\"Widget\",2.5,10]
[\"purchase\",\"Gadget, large\",0.5,3]
[\"sale\",\"Widget\",4.0,3]
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_roundtrip_sample() {
        let state = sample_state();
        assert_eq!(decode(&encode(&state)).unwrap(), state);
    }

    #[test]
    fn test_roundtrip_fresh() {
        let state = LedgerState::new();
        let text = encode(&state);
        assert_eq!(text, "Balance: 0.0\nInventory:\nHistory:\n");
        assert_eq!(decode(&text).unwrap(), state);
    }

    #[test]
    fn test_edited_balance_loads_unchanged() {
        let text = encode(&sample_state()).replacen("Balance: 85.5", "Balance: 500.0", 1);
        let state = decode(&text).unwrap();

        let err = shopledger_core::verify(&state).unwrap_err();
        assert_eq!(err.stored, 500.0);
        assert_ne!(err.stored, err.computed);
    }

    fn assert_corrupt_at(text: &str, location: &str) {
        match decode(text) {
            Err(StoreError::CorruptState { location: got, .. }) => assert_eq!(got, location),
            other => panic!("expected corrupt state at {location}, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_malformed_records() {
        assert_corrupt_at("", "line 1");
        assert_corrupt_at("Saldo: 1\nInventory:\nHistory:\n", "line 1");
        assert_corrupt_at("Balance: abc\nInventory:\nHistory:\n", "line 1");
        assert_corrupt_at("Balance: NaN\nInventory:\nHistory:\n", "line 1");
        assert_corrupt_at("Balance: 1\nHistory:\n", "line 2");
        assert_corrupt_at("Balance: 1\n", "end of file");
        assert_corrupt_at("Balance: 1\nInventory:\n", "end of file");
        assert_corrupt_at(
            "Balance: 1\nInventory:\nProduct: A, Price: x, Quantity: 1\nHistory:\n",
            "line 3",
        );
        assert_corrupt_at(
            "Balance: 1\nInventory:\nProduct: A, Price: 1, Quantity: -1\nHistory:\n",
            "line 3",
        );
        assert_corrupt_at(
            "Balance: 1\nInventory:\nProduct: A, Price: 1, Quantity: 1\nProduct: A, Price: 1, Quantity: 1\nHistory:\n",
            "line 4",
        );
        assert_corrupt_at("Balance: 1\nInventory:\n\nHistory:\n", "line 3");
        assert_corrupt_at(
            "Balance: 1\nInventory:\nProduct: A, Price: 1, Quantity: 9223372036854775808\nHistory:\n",
            "line 3",
        );
    }

    #[test]
    fn test_rejects_unknown_action_shapes() {
        let cases = [
            "('saldo', 100.0)",
            "[\"saldo\",100.0]",
            "[\"deposit\"]",
            "[\"deposit\",\"100\"]",
            "[\"purchase\",\"Widget\",2.5]",
            "[\"sale\",\"Widget\",2.5,-1]",
            "[\"purchase\",\"Widget\",2.5,9223372036854775808]",
            "[\"sale\",\"\",2.5,1]",
            "{\"kind\":\"deposit\",\"amount\":1.0}",
            "",
        ];
        for line in cases {
            let text = format!("Balance: 0\nInventory:\nHistory:\n{line}\n");
            assert_corrupt_at(&text, "line 4");
        }
    }

    fn command() -> impl Strategy<Value = Command> {
        let name = prop::sample::select(vec!["Widget", "Gadget", "Gadget, large", "ünïcode"]);
        prop_oneof![
            (-1_000_000i64..1_000_000).prop_map(|c| Command::deposit(c as f64 / 100.0)),
            (name.clone(), 0u32..100_000, 0u64..50)
                .prop_map(|(n, c, q)| Command::purchase(n, c as f64 / 1000.0, q)),
            (name, 0u32..100_000, 0u64..50)
                .prop_map(|(n, c, q)| Command::sale(n, c as f64 / 1000.0, q)),
        ]
    }

    proptest! {
        #[test]
        fn test_roundtrip_is_exact(commands in prop::collection::vec(command(), 0..40)) {
            let mut state = LedgerState::new();
            for command in commands {
                let _ = state.apply(command);
            }

            let decoded = decode(&encode(&state)).unwrap();
            prop_assert_eq!(decoded.balance().to_bits(), state.balance().to_bits());
            prop_assert_eq!(decoded, state);
        }
    }
}
