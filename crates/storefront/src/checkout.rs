//! The cart checkout flow.
//!
//! A checkout attempt is a finite state machine with exactly one terminal
//! state. The original front-end spread this over independent provider
//! callbacks (`transactionHash` / `receipt` / `error`) that could each
//! mutate shared state; here the stages run in order and the store is only
//! touched by the rules below:
//!
//! - failure before broadcast: cart unchanged, nothing appended to history
//! - receipt with success status: one Success record appended, cart cleared
//! - receipt with failed status: one Failed record appended, cart kept
//! - provider error after broadcast, before a receipt: cart unchanged,
//!   nothing appended (there is no receipt for a record to reflect)

use agrimarket_core::{ProductId, TokenAmount, TransactionRecord};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::chain::{ChainError, ChainReceipt};
use crate::store::MarketStore;

/// Stages of a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// No attempt running.
    Idle,
    /// The cart had no items; nothing was attempted.
    Empty,
    /// Gas estimation requested.
    Submitting,
    /// Transaction sent, awaiting the hash.
    Broadcasting,
    /// Hash received, awaiting the receipt.
    Confirming,
    /// Terminal: receipt with success status.
    SettledSuccess,
    /// Terminal: failure at any stage, or receipt with failed status.
    SettledFailed,
}

impl CheckoutPhase {
    /// True for the two settled terminal states.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::SettledSuccess | Self::SettledFailed)
    }
}

/// The chain operations a checkout needs, behind a seam so the flow can be
/// exercised without a node.
#[async_trait]
pub trait PurchaseGateway: Send + Sync {
    /// Estimate gas for purchasing the given products with the given value
    /// attached.
    async fn estimate_purchase(
        &self,
        product_ids: &[ProductId],
        value: TokenAmount,
    ) -> Result<u64, ChainError>;

    /// Current network gas price in wei.
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// Broadcast the purchase; returns the transaction hash once the
    /// provider accepts it.
    async fn broadcast_purchase(
        &self,
        product_ids: &[ProductId],
        value: TokenAmount,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<String, ChainError>;

    /// Wait for the receipt of a broadcast transaction.
    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<ChainReceipt, ChainError>;
}

/// Result of a finished checkout attempt.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    /// The state the attempt terminated in.
    pub phase: CheckoutPhase,
    /// Final user-facing message.
    pub message: String,
    /// Transaction hash, recorded as soon as the provider returned it.
    pub tx_hash: Option<String>,
    /// Progress messages in order of occurrence.
    pub progress: Vec<String>,
    /// The history record appended by this attempt, if any.
    pub record: Option<TransactionRecord>,
}

impl CheckoutOutcome {
    /// True when the purchase settled successfully.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.phase == CheckoutPhase::SettledSuccess
    }

    fn settled_failed(message: String, tx_hash: Option<String>, progress: Vec<String>) -> Self {
        Self {
            phase: CheckoutPhase::SettledFailed,
            message,
            tx_hash,
            progress,
            record: None,
        }
    }
}

/// Run one checkout attempt against the store.
///
/// Only one attempt may run at a time: a second concurrent call is refused
/// with a busy message instead of racing the first. The cart snapshot is
/// taken once at entry; entries removed while the attempt is in flight are
/// still part of the purchase.
#[instrument(skip(gateway, store))]
pub async fn run<G: PurchaseGateway + ?Sized>(gateway: &G, store: &MarketStore) -> CheckoutOutcome {
    let Some(_guard) = store.try_begin_checkout() else {
        return CheckoutOutcome {
            phase: CheckoutPhase::Idle,
            message: "A checkout is already in progress.".to_string(),
            tx_hash: None,
            progress: Vec::new(),
            record: None,
        };
    };

    let cart = store.cart_snapshot().await;
    if cart.is_empty() {
        return CheckoutOutcome {
            phase: CheckoutPhase::Empty,
            message: "Your cart is empty.".to_string(),
            tx_hash: None,
            progress: Vec::new(),
            record: None,
        };
    }

    let product_ids = cart.product_ids();
    let mut progress = vec!["Initiating transaction...".to_string()];
    info!(phase = ?CheckoutPhase::Submitting, items = product_ids.len(), "checkout started");

    let total = match cart.total() {
        Ok(total) => total,
        Err(error) => {
            return CheckoutOutcome::settled_failed(
                format!("Transaction failed: {error}"),
                None,
                progress,
            );
        }
    };

    // Submitting: the estimate is a hard input to the send; a failure here
    // short-circuits with no history entry.
    let gas_limit = match gateway.estimate_purchase(&product_ids, total).await {
        Ok(gas_limit) => gas_limit,
        Err(error) => {
            warn!(%error, "gas estimation failed");
            return CheckoutOutcome::settled_failed(
                format!("Transaction failed: {error}"),
                None,
                progress,
            );
        }
    };

    let gas_price = match gateway.gas_price().await {
        Ok(gas_price) => gas_price,
        Err(error) => {
            warn!(%error, "gas price query failed");
            return CheckoutOutcome::settled_failed(
                format!("Transaction failed: {error}"),
                None,
                progress,
            );
        }
    };

    // Broadcasting: a rejection means nothing reached the chain.
    info!(phase = ?CheckoutPhase::Broadcasting, gas_limit, gas_price, "sending purchase");
    let tx_hash = match gateway
        .broadcast_purchase(&product_ids, total, gas_limit, gas_price)
        .await
    {
        Ok(tx_hash) => tx_hash,
        Err(error) => {
            warn!(%error, "broadcast failed");
            return CheckoutOutcome::settled_failed(
                format!("Transaction failed: {error}"),
                None,
                progress,
            );
        }
    };

    // The hash is shown before confirmation.
    info!(phase = ?CheckoutPhase::Confirming, %tx_hash, "purchase broadcast");
    progress.push(format!(
        "Transaction sent! Hash: {tx_hash}. Waiting for confirmation..."
    ));

    // Confirming.
    let receipt = match gateway.wait_for_receipt(&tx_hash).await {
        Ok(receipt) => receipt,
        Err(error) => {
            warn!(%tx_hash, %error, "no receipt for broadcast transaction");
            return CheckoutOutcome::settled_failed(
                format!("Transaction failed: {error}"),
                Some(tx_hash),
                progress,
            );
        }
    };

    // Settled: the record always reflects what the receipt reported.
    let record = TransactionRecord {
        tx_hash: receipt.tx_hash.clone(),
        block_hash: receipt.block_hash.clone(),
        block_number: receipt.block_number,
        from: receipt.from.clone(),
        to: receipt.to.clone(),
        gas_used: receipt.gas_used,
        cumulative_gas_used: receipt.cumulative_gas_used,
        status: receipt.status,
        time: Utc::now(),
        product_ids,
    };
    store.append_record(record.clone()).await;

    if receipt.status.is_success() {
        store.clear_cart().await;
        info!(%tx_hash, "purchase confirmed");
        CheckoutOutcome {
            phase: CheckoutPhase::SettledSuccess,
            message: "Transaction successful! Your purchase has been completed.".to_string(),
            tx_hash: Some(tx_hash),
            progress,
            record: Some(record),
        }
    } else {
        // Confirmed but reverted: the cart is kept so the user can retry.
        warn!(%tx_hash, "purchase reverted on chain");
        CheckoutOutcome {
            phase: CheckoutPhase::SettledFailed,
            message: "Transaction reverted on chain. Your cart was kept.".to_string(),
            tx_hash: Some(tx_hash),
            progress,
            record: Some(record),
        }
    }
}
