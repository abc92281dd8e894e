//! End-to-end checkout flows against a scripted gateway.

use agrimarket_core::{ProductId, TxStatus};
use agrimarket_integration_tests::{FailAt, ONE_TOKEN, ScriptedGateway, sample_product};
use agrimarket_storefront::checkout::{self, CheckoutPhase};
use agrimarket_storefront::store::MarketStore;

async fn store_with_two_items() -> MarketStore {
    let store = MarketStore::new();
    store.add_to_cart(sample_product(1, ONE_TOKEN)).await;
    store.add_to_cart(sample_product(2, ONE_TOKEN / 2)).await;
    store
}

#[tokio::test]
async fn checkout_runs_stages_in_order() {
    let store = store_with_two_items().await;
    let gateway = ScriptedGateway::succeeding();

    let outcome = checkout::run(&gateway, &store).await;

    assert_eq!(outcome.phase, CheckoutPhase::SettledSuccess);
    assert_eq!(
        gateway.calls(),
        vec!["estimate", "gas_price", "broadcast", "receipt"]
    );
}

#[tokio::test]
async fn successful_checkout_empties_cart_and_appends_matching_record() {
    let store = store_with_two_items().await;
    let ids_before = store.cart_snapshot().await.product_ids();

    let outcome = checkout::run(&ScriptedGateway::succeeding(), &store).await;

    assert!(outcome.succeeded());
    assert!(store.cart_snapshot().await.is_empty());

    let history = store.history().await;
    assert_eq!(history.len(), 1);
    let record = history.first().expect("one record");
    assert_eq!(record.status, TxStatus::Success);
    assert_eq!(record.product_ids, ids_before);
    assert_eq!(record.gas_used, 84_213);
    assert_eq!(record.cumulative_gas_used, 1_204_213);
}

#[tokio::test]
async fn pre_broadcast_failures_stop_before_the_send() {
    for fail_at in [FailAt::Estimate, FailAt::GasPrice] {
        let store = store_with_two_items().await;
        let gateway = ScriptedGateway::failing_at(fail_at);

        let outcome = checkout::run(&gateway, &store).await;

        assert_eq!(outcome.phase, CheckoutPhase::SettledFailed);
        assert!(outcome.record.is_none());
        assert_eq!(store.cart_snapshot().await.len(), 2, "cart must be kept");
        assert!(store.history().await.is_empty(), "no record may be appended");
        assert!(
            !gateway.calls().contains(&"broadcast"),
            "nothing may reach the chain after a {fail_at:?} failure"
        );
    }
}

#[tokio::test]
async fn broadcast_rejection_appends_no_record() {
    let store = store_with_two_items().await;
    let gateway = ScriptedGateway::failing_at(FailAt::Broadcast);

    let outcome = checkout::run(&gateway, &store).await;

    assert_eq!(outcome.phase, CheckoutPhase::SettledFailed);
    assert!(outcome.tx_hash.is_none());
    assert!(store.history().await.is_empty());
    assert_eq!(store.cart_snapshot().await.len(), 2);
}

#[tokio::test]
async fn reverted_purchase_keeps_cart_and_retry_can_succeed() {
    let store = store_with_two_items().await;

    // First attempt confirms but reverts.
    let outcome = checkout::run(
        &ScriptedGateway::with_receipt_status(TxStatus::Failed),
        &store,
    )
    .await;
    assert_eq!(outcome.phase, CheckoutPhase::SettledFailed);
    assert_eq!(store.cart_snapshot().await.len(), 2);
    assert_eq!(store.history().await.len(), 1);
    assert_eq!(
        store.history().await.first().map(|record| record.status),
        Some(TxStatus::Failed)
    );

    // The kept cart supports a fresh attempt, which settles cleanly.
    let outcome = checkout::run(&ScriptedGateway::succeeding(), &store).await;
    assert!(outcome.succeeded());
    assert!(store.cart_snapshot().await.is_empty());

    let history = store.history().await;
    assert_eq!(history.len(), 2);
    assert_eq!(history.last().map(|record| record.status), Some(TxStatus::Success));
}

#[tokio::test]
async fn lost_receipt_reports_hash_without_a_record() {
    let store = store_with_two_items().await;
    let gateway = ScriptedGateway::failing_at(FailAt::Receipt);

    let outcome = checkout::run(&gateway, &store).await;

    assert_eq!(outcome.phase, CheckoutPhase::SettledFailed);
    assert!(outcome.tx_hash.is_some(), "the broadcast hash is still shown");
    assert!(store.history().await.is_empty());
    assert_eq!(store.cart_snapshot().await.len(), 2);
}

#[tokio::test]
async fn removal_before_checkout_shrinks_the_purchase() {
    let store = store_with_two_items().await;
    store.remove_from_cart(ProductId::new(1)).await;

    let outcome = checkout::run(&ScriptedGateway::succeeding(), &store).await;

    assert!(outcome.succeeded());
    let history = store.history().await;
    assert_eq!(
        history.first().map(|record| record.product_ids.clone()),
        Some(vec![ProductId::new(2)])
    );
}

#[tokio::test]
async fn empty_cart_never_reaches_the_gateway() {
    let store = MarketStore::new();
    let gateway = ScriptedGateway::succeeding();

    let outcome = checkout::run(&gateway, &store).await;

    assert_eq!(outcome.phase, CheckoutPhase::Empty);
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn second_concurrent_checkout_is_refused() {
    let store = store_with_two_items().await;
    let gateway = ScriptedGateway::succeeding();

    let guard = store.try_begin_checkout().expect("gate free");
    let outcome = checkout::run(&gateway, &store).await;
    drop(guard);

    assert_eq!(outcome.phase, CheckoutPhase::Idle);
    assert!(gateway.calls().is_empty(), "a refused attempt touches nothing");

    // Once the gate is released a normal attempt goes through.
    let outcome = checkout::run(&gateway, &store).await;
    assert!(outcome.succeeded());
}
