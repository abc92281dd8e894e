//! The session-local shopping cart.
//!
//! The cart holds product snapshots in insertion order; duplicates are
//! permitted. Membership never outlives the session and is never persisted.

use serde::{Deserialize, Serialize};

use crate::types::{AmountError, Product, ProductId, TokenAmount};

/// An ordered sequence of product snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    entries: Vec<Product>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a product snapshot. The same product may appear any number of
    /// times.
    pub fn add(&mut self, product: Product) {
        self.entries.push(product);
    }

    /// Remove every entry with the given id, returning how many were
    /// removed. Removing an absent id leaves the cart unchanged.
    pub fn remove(&mut self, id: ProductId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|product| product.id != id);
        before - self.entries.len()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// True when no entries are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries (duplicates counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Product] {
        &self.entries
    }

    /// Identifiers of the entries, in order, duplicates preserved.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.entries.iter().map(|product| product.id).collect()
    }

    /// Total price of all entries in base units.
    ///
    /// This is a derived value: callers recompute it whenever the cart
    /// changes rather than caching it alongside the entries.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Overflow`] if the sum exceeds the base-unit
    /// range.
    pub fn total(&self) -> Result<TokenAmount, AmountError> {
        self.entries
            .iter()
            .try_fold(TokenAmount::ZERO, |total, product| {
                total.checked_add(product.price).ok_or(AmountError::Overflow)
            })
    }
}
