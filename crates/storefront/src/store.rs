//! The shared market store.
//!
//! Cart, transaction history, and the locally-hidden product set have one
//! owner with explicit mutation entry points, instead of setter callbacks
//! threaded through independent component trees. Everything here is
//! session-local: nothing survives a restart.

use std::collections::HashSet;

use agrimarket_core::{Cart, Product, ProductId, TransactionRecord};
use tokio::sync::{Mutex, MutexGuard, RwLock};

#[derive(Default)]
struct StoreInner {
    cart: Cart,
    history: Vec<TransactionRecord>,
    hidden: HashSet<ProductId>,
}

/// Single authoritative owner of session-local marketplace state.
#[derive(Default)]
pub struct MarketStore {
    inner: RwLock<StoreInner>,
    checkout_gate: Mutex<()>,
}

impl MarketStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a product snapshot to the cart. Duplicates are permitted.
    pub async fn add_to_cart(&self, product: Product) {
        self.inner.write().await.cart.add(product);
    }

    /// Remove every cart entry with the given id, returning how many were
    /// removed. Absent ids are a no-op.
    pub async fn remove_from_cart(&self, id: ProductId) -> usize {
        self.inner.write().await.cart.remove(id)
    }

    /// Drop all cart entries.
    pub async fn clear_cart(&self) {
        self.inner.write().await.cart.clear();
    }

    /// A snapshot of the cart for rendering or checkout.
    pub async fn cart_snapshot(&self) -> Cart {
        self.inner.read().await.cart.clone()
    }

    /// Number of cart entries.
    pub async fn cart_len(&self) -> usize {
        self.inner.read().await.cart.len()
    }

    /// Hide a product from the local catalog view and drop its cart
    /// entries. The chain and the history are never touched: hiding is a
    /// view operation, not a deletion.
    pub async fn hide_product(&self, id: ProductId) {
        let mut inner = self.inner.write().await;
        inner.hidden.insert(id);
        inner.cart.remove(id);
    }

    /// The currently hidden product ids.
    pub async fn hidden_products(&self) -> HashSet<ProductId> {
        self.inner.read().await.hidden.clone()
    }

    /// Append a settled-transaction record to the history.
    pub async fn append_record(&self, record: TransactionRecord) {
        self.inner.write().await.history.push(record);
    }

    /// The history in append order.
    pub async fn history(&self) -> Vec<TransactionRecord> {
        self.inner.read().await.history.clone()
    }

    /// Claim the checkout gate. Returns `None` while another checkout holds
    /// it; the guard releases the gate when dropped.
    pub fn try_begin_checkout(&self) -> Option<MutexGuard<'_, ()>> {
        self.checkout_gate.try_lock().ok()
    }
}

#[cfg(test)]
mod tests {
    use agrimarket_core::TokenAmount;

    use super::*;

    fn product(id: u64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            image_cid: String::new(),
            price: TokenAmount::from_base_units(100),
        }
    }

    #[tokio::test]
    async fn test_hide_product_drops_cart_entries_too() {
        let store = MarketStore::new();
        store.add_to_cart(product(1)).await;
        store.add_to_cart(product(2)).await;
        store.add_to_cart(product(1)).await;

        store.hide_product(ProductId::new(1)).await;

        assert!(store.hidden_products().await.contains(&ProductId::new(1)));
        let cart = store.cart_snapshot().await;
        assert_eq!(cart.product_ids(), vec![ProductId::new(2)]);
    }

    #[tokio::test]
    async fn test_remove_from_cart_reports_removed_count() {
        let store = MarketStore::new();
        store.add_to_cart(product(1)).await;
        store.add_to_cart(product(1)).await;

        assert_eq!(store.remove_from_cart(ProductId::new(1)).await, 2);
        assert_eq!(store.remove_from_cart(ProductId::new(1)).await, 0);
        assert!(store.cart_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_checkout_gate_is_exclusive() {
        let store = MarketStore::new();

        let guard = store.try_begin_checkout();
        assert!(guard.is_some());
        assert!(store.try_begin_checkout().is_none());

        drop(guard);
        assert!(store.try_begin_checkout().is_some());
    }

    #[tokio::test]
    async fn test_history_preserves_append_order() {
        use agrimarket_core::TxStatus;
        use chrono::Utc;

        let store = MarketStore::new();
        for n in 0..3 {
            store
                .append_record(TransactionRecord {
                    tx_hash: format!("0x{n}"),
                    block_hash: None,
                    block_number: None,
                    from: String::new(),
                    to: None,
                    gas_used: 0,
                    cumulative_gas_used: 0,
                    status: TxStatus::Success,
                    time: Utc::now(),
                    product_ids: Vec::new(),
                })
                .await;
        }

        let hashes: Vec<String> = store
            .history()
            .await
            .into_iter()
            .map(|record| record.tx_hash)
            .collect();
        assert_eq!(hashes, vec!["0x0", "0x1", "0x2"]);
    }
}
