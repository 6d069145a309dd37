//! SQLite schema for the ledger tables.

use rusqlite::Connection;

use crate::error::Result;

/// Create the ledger tables if they are missing. Safe to call on every open.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Single-row table holding the stored balance
        CREATE TABLE IF NOT EXISTS ledger (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            balance REAL NOT NULL
        );

        -- Inventory, position keeps insertion order
        CREATE TABLE IF NOT EXISTS products (
            position INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            price REAL NOT NULL,
            quantity INTEGER NOT NULL
        );

        -- Action log, seq is the 0-based log index
        CREATE TABLE IF NOT EXISTS actions (
            seq INTEGER PRIMARY KEY,
            kind TEXT NOT NULL,               -- deposit | purchase | sale
            amount REAL,                      -- deposit only
            product TEXT,                     -- purchase and sale
            price REAL,
            quantity INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_actions_product ON actions(product);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_creates_ledger_tables() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(tables(&conn), vec!["actions", "ledger", "products"]);
    }

    #[test]
    fn test_repeated_setup_keeps_rows() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO ledger (id, balance) VALUES (1, 7.5)", [])
            .unwrap();

        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();

        let balance: f64 = conn
            .query_row("SELECT balance FROM ledger", [], |row| row.get(0))
            .unwrap();
        assert_eq!(balance, 7.5);
        assert_eq!(tables(&conn), vec!["actions", "ledger", "products"]);
    }
}
