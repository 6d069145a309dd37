//! Commands and the comma-separated text protocol.
//!
//! A protocol line looks like `purchase,Widget,2.50,10`. Fields are trimmed,
//! the verb is matched case-insensitively, and product names are kept exactly
//! as given.

use std::str::FromStr;

use crate::error::CommandError;

/// A mutation request for the Command Processor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Deposit {
        amount: f64,
    },
    Purchase {
        name: String,
        price: f64,
        quantity: u64,
    },
    Sale {
        name: String,
        price: f64,
        quantity: u64,
    },
}

impl Command {
    pub fn deposit(amount: f64) -> Self {
        Command::Deposit { amount }
    }

    pub fn purchase(name: impl Into<String>, price: f64, quantity: u64) -> Self {
        Command::Purchase {
            name: name.into(),
            price,
            quantity,
        }
    }

    pub fn sale(name: impl Into<String>, price: f64, quantity: u64) -> Self {
        Command::Sale {
            name: name.into(),
            price,
            quantity,
        }
    }
}

/// A read-only request answered by the Query Facade.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Balance,
    List,
    Product { name: String },
    History { start: Option<i64>, end: Option<i64> },
    /// Replay the log and compare against the stored state.
    Check,
}

/// One parsed line of the text protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Mutate(Command),
    Query(Query),
    Quit,
}

impl Request {
    /// Parse a protocol line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let verb = fields[0].to_lowercase();
        let args = &fields[1..];

        let request = match verb.as_str() {
            "" => return Err(CommandError::invalid("empty command")),
            "deposit" => {
                let [amount] = expect_args::<1>(&verb, args)?;
                Request::Mutate(Command::Deposit {
                    amount: parse_number("amount", amount)?,
                })
            }
            "purchase" | "sale" => {
                let [name, price, quantity] = expect_args::<3>(&verb, args)?;
                let name = parse_name(name)?;
                let price = parse_number("price", price)?;
                let quantity = parse_quantity(quantity)?;
                if verb == "purchase" {
                    Request::Mutate(Command::Purchase {
                        name,
                        price,
                        quantity,
                    })
                } else {
                    Request::Mutate(Command::Sale {
                        name,
                        price,
                        quantity,
                    })
                }
            }
            "balance" => {
                expect_args::<0>(&verb, args)?;
                Request::Query(Query::Balance)
            }
            "list" => {
                expect_args::<0>(&verb, args)?;
                Request::Query(Query::List)
            }
            "product" => {
                let [name] = expect_args::<1>(&verb, args)?;
                Request::Query(Query::Product {
                    name: parse_name(name)?,
                })
            }
            "history" => {
                if args.len() > 2 {
                    return Err(CommandError::invalid(format!(
                        "history takes at most 2 arguments, got {}",
                        args.len()
                    )));
                }
                let start = args.first().map(|s| parse_index("start", s)).transpose()?;
                let end = args.get(1).map(|s| parse_index("end", s)).transpose()?;
                Request::Query(Query::History { start, end })
            }
            "check" => {
                expect_args::<0>(&verb, args)?;
                Request::Query(Query::Check)
            }
            "quit" => {
                expect_args::<0>(&verb, args)?;
                Request::Quit
            }
            other => return Err(CommandError::invalid(format!("unknown verb: {other}"))),
        };

        Ok(request)
    }
}

impl FromStr for Request {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Request::parse(s)
    }
}

fn expect_args<'a, const N: usize>(
    verb: &str,
    args: &[&'a str],
) -> Result<[&'a str; N], CommandError> {
    <[&str; N]>::try_from(args).map_err(|_| {
        CommandError::invalid(format!(
            "{verb} takes {N} argument(s), got {}",
            args.len()
        ))
    })
}

fn parse_name(field: &str) -> Result<String, CommandError> {
    check_name(field)?;
    Ok(field.to_string())
}

/// Product names must be non-empty and free of control characters so they
/// survive line-oriented persistence.
pub(crate) fn check_name(name: &str) -> Result<(), CommandError> {
    if name.is_empty() {
        return Err(CommandError::invalid("product name is empty"));
    }
    if name.chars().any(char::is_control) {
        return Err(CommandError::invalid("product name contains control characters"));
    }
    Ok(())
}

fn parse_number(what: &str, field: &str) -> Result<f64, CommandError> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::invalid(format!(
            "{what} is not a finite number: {field:?}"
        ))),
    }
}

fn parse_quantity(field: &str) -> Result<u64, CommandError> {
    field.parse::<u64>().map_err(|_| {
        CommandError::invalid(format!(
            "quantity is not a non-negative integer: {field:?}"
        ))
    })
}

fn parse_index(what: &str, field: &str) -> Result<i64, CommandError> {
    field
        .parse::<i64>()
        .map_err(|_| CommandError::invalid(format!("{what} is not an integer: {field:?}")))
}
