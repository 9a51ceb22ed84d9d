//! Cart Manager: an ordered list of product lines persisted under `cart`.
//!
//! Every operation reads the current cart from storage, applies the change,
//! and writes the whole list back. Title and price are captured when a line
//! is added and are not refreshed from the catalog afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::product::Product;
use crate::storage::{Storage, StorageError, keys};
use crate::types::{Price, ProductId};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Checkout was requested with no lines in the cart.
    #[error("nothing to purchase")]
    Empty,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// What the add-to-cart button sends: a product reference with the fields
/// the cart denormalizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
}

impl From<&Product> for CartItem {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
        }
    }
}

/// One cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub qty: u32,
}

impl CartLine {
    /// Price of this line (`price * qty`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.qty)
    }
}

/// A receipt line, frozen at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub title: String,
    pub price: Price,
    pub qty: u32,
    pub line_total: Price,
}

/// Result of a simulated checkout. Not persisted.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub reference: Uuid,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<ReceiptLine>,
    pub total: Price,
}

/// Cart operations over a [`Storage`].
#[derive(Debug, Clone)]
pub struct CartManager<S> {
    store: CatalogStore<S>,
}

impl<S: Storage> CartManager<S> {
    /// Wrap a storage backend.
    pub const fn new(storage: S) -> Self {
        Self {
            store: CatalogStore::new(storage),
        }
    }

    /// Current lines, in the order they were first added.
    ///
    /// Lines with a zero quantity are dropped.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        let mut lines: Vec<CartLine> = self.store.get(keys::CART, Vec::new());
        lines.retain(|line| line.qty > 0);
        lines
    }

    fn save(&self, lines: &[CartLine]) -> Result<(), CartError> {
        self.store.set(keys::CART, lines)?;
        Ok(())
    }

    /// Add one unit of `item`.
    ///
    /// Repeated adds of the same id increment the existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn add(&self, item: impl Into<CartItem>) -> Result<(), CartError> {
        let item = item.into();
        let mut lines = self.lines();

        match lines.iter_mut().find(|line| line.id == item.id) {
            Some(line) => line.qty = line.qty.saturating_add(1),
            None => lines.push(CartLine {
                id: item.id.clone(),
                title: item.title,
                price: item.price,
                qty: 1,
            }),
        }

        debug!(id = %item.id, "added to cart");
        self.save(&lines)
    }

    /// Remove the line for `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn remove(&self, id: &ProductId) -> Result<(), CartError> {
        let mut lines = self.lines();
        let before = lines.len();
        lines.retain(|line| &line.id != id);
        if lines.len() == before {
            return Ok(());
        }
        self.save(&lines)
    }

    /// Set the quantity of the line for `id`.
    ///
    /// Zero or negative quantities remove the line. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn set_quantity(&self, id: &ProductId, qty: i64) -> Result<(), CartError> {
        if qty <= 0 {
            return self.remove(id);
        }

        let mut lines = self.lines();
        let Some(line) = lines.iter_mut().find(|line| &line.id == id) else {
            return Ok(());
        };
        line.qty = u32::try_from(qty).unwrap_or(u32::MAX);
        self.save(&lines)
    }

    /// Sum of `price * qty` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines().iter().map(CartLine::line_total).sum()
    }

    /// Total number of units, for the header badge.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lines()
            .iter()
            .fold(0u32, |n, line| n.saturating_add(line.qty))
    }

    /// Whether the cart has no lines. Checkout is disabled when true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Simulate payment: clear the cart and hand back a receipt.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] without touching storage when the cart is
    /// empty, or a storage error if clearing fails.
    pub fn checkout(&self) -> Result<Receipt, CartError> {
        let lines = self.lines();
        if lines.is_empty() {
            return Err(CartError::Empty);
        }

        let total: Price = lines.iter().map(CartLine::line_total).sum();
        self.save(&[])?;

        let receipt = Receipt {
            reference: Uuid::new_v4(),
            issued_at: Utc::now(),
            lines: lines
                .into_iter()
                .map(|line| ReceiptLine {
                    line_total: line.line_total(),
                    title: line.title,
                    price: line.price,
                    qty: line.qty,
                })
                .collect(),
            total,
        };

        info!(reference = %receipt.reference, total = %receipt.total, "checkout complete");
        Ok(receipt)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn item(id: &str, cents: i64) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            title: format!("Item {id}"),
            price: Price::from_cents(cents),
        }
    }

    #[test]
    fn test_add_same_id_merges() {
        let cart = CartManager::new(MemoryStorage::new());
        cart.add(item("beat-1", 2999)).unwrap();
        cart.add(item("beat-1", 2999)).unwrap();

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].qty, 2);
    }

    #[test]
    fn test_add_keeps_captured_price() {
        let cart = CartManager::new(MemoryStorage::new());
        cart.add(item("beat-1", 2999)).unwrap();
        cart.add(item("beat-1", 100)).unwrap();
        assert_eq!(cart.lines()[0].price, Price::from_cents(2999));
    }

    #[test]
    fn test_total_example() {
        let cart = CartManager::new(MemoryStorage::new());
        cart.add(item("beat-1", 2999)).unwrap();
        cart.add(item("pack-1", 1999)).unwrap();
        cart.set_quantity(&ProductId::new("pack-1"), 2).unwrap();

        assert_eq!(cart.total(), Price::from_cents(6997));
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_set_quantity_zero_or_negative_removes() {
        let cart = CartManager::new(MemoryStorage::new());
        cart.add(item("a", 100)).unwrap();
        cart.add(item("b", 100)).unwrap();

        cart.set_quantity(&ProductId::new("a"), 0).unwrap();
        cart.set_quantity(&ProductId::new("b"), -5).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_unknown_is_noop() {
        let storage = MemoryStorage::new();
        let cart = CartManager::new(&storage);
        cart.add(item("a", 100)).unwrap();
        let before = storage.read(keys::CART).unwrap();

        cart.set_quantity(&ProductId::new("missing"), 4).unwrap();
        cart.remove(&ProductId::new("missing")).unwrap();
        assert_eq!(storage.read(keys::CART).unwrap(), before);
    }

    #[test]
    fn test_total_tracks_operation_sequence() {
        let cart = CartManager::new(MemoryStorage::new());
        let ops: [(&str, i64); 7] = [
            ("a", 1),
            ("b", 3),
            ("a", 5),
            ("c", 0),
            ("b", -1),
            ("d", 2),
            ("a", 2),
        ];
        for (id, cents) in [("a", 1050), ("b", 333), ("c", 1), ("d", 99_999)] {
            cart.add(item(id, cents)).unwrap();
        }
        for (id, qty) in ops {
            cart.set_quantity(&ProductId::new(id), qty).unwrap();
            let expected: Price = cart
                .lines()
                .iter()
                .map(|l| l.price.line_total(l.qty))
                .sum();
            assert_eq!(cart.total(), expected);
        }
        assert_eq!(cart.total(), Price::from_cents(1050 * 2 + 99_999 * 2));
    }

    #[test]
    fn test_huge_line_saturates_total_and_checkout() {
        let storage = MemoryStorage::new();
        let cart = CartManager::new(&storage);
        cart.add(CartItem {
            id: ProductId::new("beat-big"),
            title: "Big".to_string(),
            price: Price::parse("1e20").unwrap(),
        })
        .unwrap();
        cart.add(item("pack-1", 1999)).unwrap();
        cart.set_quantity(&ProductId::new("beat-big"), i64::MAX).unwrap();

        // A reopened cart over the same storage must still load and sum.
        let reopened = CartManager::new(&storage);
        assert_eq!(reopened.lines()[0].qty, u32::MAX);
        assert_eq!(reopened.total().amount(), rust_decimal::Decimal::MAX);

        let receipt = reopened.checkout().unwrap();
        assert_eq!(receipt.total.amount(), rust_decimal::Decimal::MAX);
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_checkout_empty_leaves_storage_untouched() {
        let storage = MemoryStorage::new();
        let cart = CartManager::new(&storage);

        assert!(matches!(cart.checkout(), Err(CartError::Empty)));
        assert!(storage.read(keys::CART).unwrap().is_none());
    }

    #[test]
    fn test_checkout_clears_and_returns_receipt() {
        let storage = MemoryStorage::new();
        let cart = CartManager::new(&storage);
        cart.add(item("beat-1", 2999)).unwrap();
        cart.add(item("pack-1", 1999)).unwrap();
        cart.add(item("pack-1", 1999)).unwrap();
        let total = cart.total();

        let receipt = cart.checkout().unwrap();
        assert_eq!(receipt.total, total);
        assert_eq!(receipt.total, Price::from_cents(6997));
        assert_eq!(receipt.lines.len(), 2);
        assert_eq!(receipt.lines[1].line_total, Price::from_cents(3998));
        assert_eq!(storage.read(keys::CART).unwrap().as_deref(), Some("[]"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_corrupt_cart_reads_as_empty() {
        let storage = MemoryStorage::new();
        storage.write(keys::CART, "[{\"id\":").unwrap();
        let cart = CartManager::new(&storage);
        assert!(cart.lines().is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }
}
