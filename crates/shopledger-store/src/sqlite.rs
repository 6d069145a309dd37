//! SQLite implementation of the Store trait.
//!
//! Uses rusqlite with bundled SQLite. A save rewrites all three tables inside
//! one transaction, so readers see either the previous state or the new one.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use shopledger_core::{Action, ActionKind, Inventory, LedgerState, ProductEntry};

use crate::error::{Result, StoreError};
use crate::schema;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    label: String,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and the ledger tables if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let label = format!("sqlite:{}", path.as_ref().display());
        let conn = Connection::open(path)?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label,
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            label: "sqlite::memory:".to_string(),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("connection mutex poisoned: {}", e)))?;
        f(&mut conn)
    }
}

/// One row of the `actions` table.
struct ActionRow {
    seq: i64,
    kind: String,
    amount: Option<f64>,
    product: Option<String>,
    price: Option<f64>,
    quantity: Option<i64>,
}

impl ActionRow {
    fn from_action(seq: usize, action: &Action) -> Result<Self> {
        let seq = to_sql_int("action index", seq as u64)?;
        let row = match action {
            Action::Deposit { amount } => ActionRow {
                seq,
                kind: ActionKind::Deposit.as_str().to_string(),
                amount: Some(*amount),
                product: None,
                price: None,
                quantity: None,
            },
            Action::Purchase {
                product,
                price,
                quantity,
            }
            | Action::Sale {
                product,
                price,
                quantity,
            } => ActionRow {
                seq,
                kind: action.kind().as_str().to_string(),
                amount: None,
                product: Some(product.clone()),
                price: Some(*price),
                quantity: Some(to_sql_int("quantity", *quantity)?),
            },
        };
        Ok(row)
    }

    fn into_action(self) -> std::result::Result<Action, String> {
        let kind: ActionKind = self.kind.parse()?;
        match (kind, self.amount, self.product, self.price, self.quantity) {
            (ActionKind::Deposit, Some(amount), None, None, None) => Ok(Action::Deposit {
                amount: finite("amount", amount)?,
            }),
            (kind, None, Some(product), Some(price), Some(quantity)) if kind != ActionKind::Deposit => {
                if product.is_empty() {
                    return Err("empty product name".to_string());
                }
                let price = finite("price", price)?;
                let quantity = u64::try_from(quantity)
                    .map_err(|_| format!("negative quantity {quantity}"))?;
                Ok(if kind == ActionKind::Purchase {
                    Action::Purchase {
                        product,
                        price,
                        quantity,
                    }
                } else {
                    Action::Sale {
                        product,
                        price,
                        quantity,
                    }
                })
            }
            (kind, ..) => Err(format!("columns do not match a {kind} entry")),
        }
    }
}

fn to_sql_int(what: &str, value: u64) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| StoreError::Serialization(format!("{what} {value} does not fit in SQLite")))
}

fn finite(what: &str, value: f64) -> std::result::Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{what} is not finite"))
    }
}

/// Columns are read untyped so that a value of the wrong type surfaces as
/// corrupt state at its row instead of as a database error.
fn real_column(row: &Row<'_>, idx: usize, what: &str) -> std::result::Result<Option<f64>, String> {
    match row.get_ref(idx).map_err(|e| e.to_string())? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i as f64)),
        ValueRef::Real(f) => Ok(Some(f)),
        other => Err(format!("{what} is {} not a number", other.data_type())),
    }
}

fn integer_column(row: &Row<'_>, idx: usize, what: &str) -> std::result::Result<Option<i64>, String> {
    match row.get_ref(idx).map_err(|e| e.to_string())? {
        ValueRef::Null => Ok(None),
        ValueRef::Integer(i) => Ok(Some(i)),
        other => Err(format!("{what} is {} not an integer", other.data_type())),
    }
}

fn text_column(row: &Row<'_>, idx: usize, what: &str) -> std::result::Result<Option<String>, String> {
    match row.get_ref(idx).map_err(|e| e.to_string())? {
        ValueRef::Null => Ok(None),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Some(text.to_string()))
            .map_err(|_| format!("{what} is not valid UTF-8")),
        other => Err(format!("{what} is {} not text", other.data_type())),
    }
}

fn required<T>(value: Option<T>, what: &str) -> std::result::Result<T, String> {
    value.ok_or_else(|| format!("{what} is null"))
}

fn product_columns(row: &Row<'_>) -> std::result::Result<(String, f64, i64), String> {
    Ok((
        required(text_column(row, 1, "name")?, "name")?,
        required(real_column(row, 2, "price")?, "price")?,
        required(integer_column(row, 3, "quantity")?, "quantity")?,
    ))
}

fn action_columns(row: &Row<'_>, seq: i64) -> std::result::Result<ActionRow, String> {
    Ok(ActionRow {
        seq,
        kind: required(text_column(row, 1, "kind")?, "kind")?,
        amount: real_column(row, 2, "amount")?,
        product: text_column(row, 3, "product")?,
        price: real_column(row, 4, "price")?,
        quantity: integer_column(row, 5, "quantity")?,
    })
}

fn read_state(conn: &Connection) -> Result<LedgerState> {
    let balance = conn
        .query_row("SELECT balance FROM ledger WHERE id = 1", [], |row| {
            Ok(real_column(row, 0, "balance"))
        })
        .optional()?
        .transpose()
        .map_err(|reason| StoreError::corrupt("ledger", reason))?
        .flatten();

    // position and seq are rowid aliases, always integers.
    let mut stmt =
        conn.prepare("SELECT position, name, price, quantity FROM products ORDER BY position")?;
    let products = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, product_columns(row))))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT seq, kind, amount, product, price, quantity FROM actions ORDER BY seq",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let seq: i64 = row.get(0)?;
            Ok((seq, action_columns(row, seq)))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let Some(balance) = balance else {
        if products.is_empty() && rows.is_empty() {
            return Ok(LedgerState::new());
        }
        return Err(StoreError::corrupt("ledger", "missing balance row"));
    };
    if !balance.is_finite() {
        return Err(StoreError::corrupt("ledger", "balance is not finite"));
    }

    let mut inventory = Inventory::new();
    for (position, columns) in products {
        let location = || format!("products row {position}");
        let (name, price, quantity) =
            columns.map_err(|reason| StoreError::corrupt(location(), reason))?;
        if name.is_empty() {
            return Err(StoreError::corrupt(location(), "empty product name"));
        }
        if !price.is_finite() {
            return Err(StoreError::corrupt(location(), "price is not finite"));
        }
        let quantity = u64::try_from(quantity)
            .map_err(|_| StoreError::corrupt(location(), format!("negative quantity {quantity}")))?;
        inventory.insert(name, ProductEntry::new(price, quantity));
    }

    let mut actions = Vec::with_capacity(rows.len());
    for (index, (seq, columns)) in rows.into_iter().enumerate() {
        let location = format!("actions row {seq}");
        if seq != index as i64 {
            return Err(StoreError::corrupt(location, format!("expected seq {index}")));
        }
        actions.push(
            columns
                .and_then(ActionRow::into_action)
                .map_err(|reason| StoreError::corrupt(location, reason))?,
        );
    }

    Ok(LedgerState::from_parts(balance, inventory, actions))
}

fn write_state(tx: &Transaction<'_>, state: &LedgerState) -> Result<()> {
    tx.execute("DELETE FROM actions", [])?;
    tx.execute("DELETE FROM products", [])?;
    tx.execute(
        "INSERT INTO ledger (id, balance) VALUES (1, ?1)
         ON CONFLICT(id) DO UPDATE SET balance = excluded.balance",
        params![state.balance()],
    )?;

    let mut stmt = tx.prepare(
        "INSERT INTO products (position, name, price, quantity) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, (name, entry)) in state.inventory().iter().enumerate() {
        stmt.execute(params![
            position as i64,
            name,
            entry.price,
            to_sql_int("quantity", entry.quantity)?,
        ])?;
    }

    let mut stmt = tx.prepare(
        "INSERT INTO actions (seq, kind, amount, product, price, quantity)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for (seq, action) in state.actions().iter().enumerate() {
        let row = ActionRow::from_action(seq, action)?;
        stmt.execute(params![
            row.seq,
            row.kind,
            row.amount,
            row.product,
            row.price,
            row.quantity,
        ])?;
    }

    Ok(())
}

impl Store for SqliteStore {
    fn load(&self) -> Result<LedgerState> {
        let state = self.with_conn(|conn| read_state(conn))?;
        tracing::debug!(
            store = %self.label,
            products = state.inventory().len(),
            actions = state.actions().len(),
            "loaded ledger from sqlite"
        );
        Ok(state)
    }

    fn save(&self, state: &LedgerState) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            write_state(&tx, state)?;
            tx.commit()?;
            Ok(())
        })?;
        tracing::debug!(store = %self.label, actions = state.actions().len(), "saved ledger to sqlite");
        Ok(())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
