//! Proptest generators for property-based testing.
//!
//! Prices and amounts are whole cents, so generated values print and parse
//! back exactly. Product names come from a small pool so that sales hit
//! existing stock often enough to matter.

use proptest::prelude::*;

use shopledger_core::Command;

/// Names used by the generators, including one with the `", "` separator.
pub const PRODUCT_NAMES: &[&str] = &["Widget", "Gadget", "Gizmo, large", "Śrubka"];

/// Generate a product name from [`PRODUCT_NAMES`].
pub fn product_name() -> impl Strategy<Value = String> {
    prop::sample::select(PRODUCT_NAMES).prop_map(String::from)
}

/// Generate a signed deposit amount.
pub fn amount() -> impl Strategy<Value = f64> {
    (-100_000i64..=100_000).prop_map(|cents| cents as f64 / 100.0)
}

/// Generate a non-negative unit price.
pub fn price() -> impl Strategy<Value = f64> {
    (0u32..=50_000).prop_map(|cents| f64::from(cents) / 100.0)
}

/// Generate a quantity.
pub fn quantity() -> impl Strategy<Value = u64> {
    0u64..=100
}

/// Generate any command, valid or not for a given state.
pub fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        amount().prop_map(Command::deposit),
        (product_name(), price(), quantity()).prop_map(|(n, p, q)| Command::purchase(n, p, q)),
        (product_name(), price(), quantity()).prop_map(|(n, p, q)| Command::sale(n, p, q)),
    ]
}

/// Generate up to `max` commands.
pub fn commands(max: usize) -> impl Strategy<Value = Vec<Command>> {
    prop::collection::vec(command(), 0..=max)
}

/// Render a command as a protocol line.
pub fn to_line(command: &Command) -> String {
    match command {
        Command::Deposit { amount } => format!("deposit,{amount}"),
        Command::Purchase {
            name,
            price,
            quantity,
        } => format!("purchase,{name},{price},{quantity}"),
        Command::Sale {
            name,
            price,
            quantity,
        } => format!("sale,{name},{price},{quantity}"),
    }
}

/// Generate a protocol line for a mutation. Names containing a comma are
/// left out, since the protocol splits on commas.
pub fn protocol_line() -> impl Strategy<Value = String> {
    command()
        .prop_filter("name contains a comma", |command| match command {
            Command::Deposit { .. } => true,
            Command::Purchase { name, .. } | Command::Sale { name, .. } => !name.contains(','),
        })
        .prop_map(|command| to_line(&command))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopledger_core::{verify, LedgerState, Request};

    proptest! {
        #[test]
        fn test_protocol_lines_parse_back(command in command()) {
            prop_assume!(!matches!(
                &command,
                Command::Purchase { name, .. } | Command::Sale { name, .. } if name.contains(',')
            ));
            let request = Request::parse(&to_line(&command)).unwrap();
            prop_assert_eq!(request, Request::Mutate(command));
        }

        #[test]
        fn test_verify_holds_after_every_step(cmds in commands(60)) {
            let mut state = LedgerState::new();
            for cmd in cmds {
                let before = state.clone();
                if state.apply(cmd).is_err() {
                    prop_assert_eq!(&state, &before);
                }
                prop_assert!(verify(&state).is_ok());
            }
        }
    }
}
