//! Inventory value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest quantity a command, a stock level or a stored record may carry.
///
/// Quantities are stored as signed 64-bit integers by the SQLite backend.
pub const MAX_QUANTITY: u64 = i64::MAX as u64;

/// Stock held for one product.
///
/// The price is the one recorded when the product was first purchased.
/// Later purchases only add to `quantity` and never overwrite it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductEntry {
    /// Unit price. Expected to be non-negative, not checked.
    pub price: f64,
    /// Units in stock.
    pub quantity: u64,
}

impl ProductEntry {
    pub const fn new(price: f64, quantity: u64) -> Self {
        Self { price, quantity }
    }
}

impl fmt::Display for ProductEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "price {:?}, quantity {}", self.price, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_entry_display() {
        let entry = ProductEntry::new(2.5, 15);
        assert_eq!(entry.to_string(), "price 2.5, quantity 15");
    }

    #[test]
    fn test_product_entry_serde() {
        let entry = ProductEntry::new(2.5, 15);
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"price":2.5,"quantity":15}"#);
    }
}
