//! Market store behavior across mutations.

use agrimarket_core::ProductId;
use agrimarket_integration_tests::{ONE_TOKEN, sample_product};
use agrimarket_storefront::store::MarketStore;

#[tokio::test]
async fn totals_track_every_mutation() {
    let store = MarketStore::new();
    store.add_to_cart(sample_product(1, ONE_TOKEN)).await;
    store.add_to_cart(sample_product(2, ONE_TOKEN / 2)).await;

    let total = store.cart_snapshot().await.total().expect("total");
    assert_eq!(total.to_string(), "1.5");

    store.remove_from_cart(ProductId::new(1)).await;
    let total = store.cart_snapshot().await.total().expect("total");
    assert_eq!(total.to_string(), "0.5");
}

#[tokio::test]
async fn removing_an_absent_id_changes_nothing() {
    let store = MarketStore::new();
    store.add_to_cart(sample_product(1, ONE_TOKEN)).await;
    let before = store.cart_snapshot().await;

    assert_eq!(store.remove_from_cart(ProductId::new(42)).await, 0);
    assert_eq!(store.cart_snapshot().await, before);
}

#[tokio::test]
async fn hiding_a_product_clears_it_from_cart_but_not_history() {
    use agrimarket_core::TxStatus;
    use agrimarket_storefront::checkout;

    let store = MarketStore::new();
    store.add_to_cart(sample_product(1, ONE_TOKEN)).await;
    store.add_to_cart(sample_product(2, ONE_TOKEN)).await;

    // Settle a purchase so there is history to protect.
    let outcome = checkout::run(
        &agrimarket_integration_tests::ScriptedGateway::succeeding(),
        &store,
    )
    .await;
    assert!(outcome.succeeded());
    assert_eq!(store.history().await.len(), 1);

    store.add_to_cart(sample_product(2, ONE_TOKEN)).await;
    store.hide_product(ProductId::new(2)).await;

    assert!(store.cart_snapshot().await.is_empty());
    assert!(store.hidden_products().await.contains(&ProductId::new(2)));
    assert_eq!(store.history().await.len(), 1, "history is never rewritten");
    assert_eq!(
        store.history().await.first().map(|record| record.status),
        Some(TxStatus::Success)
    );
}

#[tokio::test]
async fn duplicate_entries_survive_snapshots() {
    let store = MarketStore::new();
    store.add_to_cart(sample_product(3, 100)).await;
    store.add_to_cart(sample_product(3, 100)).await;

    let cart = store.cart_snapshot().await;
    assert_eq!(cart.len(), 2);
    assert_eq!(cart.total().expect("total").base_units(), 200);
}
