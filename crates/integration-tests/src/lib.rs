//! Shared helpers for AgriMarket integration tests.
//!
//! Provides a scripted [`PurchaseGateway`] so checkout flows can be
//! exercised end to end without a node, plus sample-data constructors.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;

use agrimarket_core::{Product, ProductId, TokenAmount, TxStatus};
use agrimarket_storefront::chain::{ChainError, ChainReceipt};
use agrimarket_storefront::checkout::PurchaseGateway;
use async_trait::async_trait;

/// One base-unit whole token (10^18 wei).
pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

/// Build a product snapshot for tests.
#[must_use]
pub fn sample_product(id: u64, base_units: u128) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: format!("Description of product {id}"),
        image_cid: format!("QmSample{id}"),
        price: TokenAmount::from_base_units(base_units),
    }
}

/// Which stage of a scripted checkout should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// Every stage succeeds.
    Nowhere,
    /// Gas estimation fails.
    Estimate,
    /// The gas price query fails.
    GasPrice,
    /// The provider rejects the broadcast.
    Broadcast,
    /// The receipt never arrives.
    Receipt,
}

/// A [`PurchaseGateway`] whose behavior is scripted per stage and which
/// records the order of the calls it receives.
pub struct ScriptedGateway {
    fail_at: FailAt,
    receipt_status: TxStatus,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedGateway {
    /// A gateway where every stage succeeds and the receipt is a success.
    #[must_use]
    pub fn succeeding() -> Self {
        Self::new(FailAt::Nowhere, TxStatus::Success)
    }

    /// A gateway that fails at the given stage.
    #[must_use]
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self::new(fail_at, TxStatus::Success)
    }

    /// A gateway whose receipt reports the given status.
    #[must_use]
    pub fn with_receipt_status(receipt_status: TxStatus) -> Self {
        Self::new(FailAt::Nowhere, receipt_status)
    }

    fn new(fail_at: FailAt, receipt_status: TxStatus) -> Self {
        Self {
            fail_at,
            receipt_status,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The stages invoked so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the call log mutex was poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, stage: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(stage);
        }
    }

    fn fail(stage: &'static str) -> ChainError {
        ChainError::Config(format!("scripted failure at {stage}"))
    }
}

#[async_trait]
impl PurchaseGateway for ScriptedGateway {
    async fn estimate_purchase(
        &self,
        _product_ids: &[ProductId],
        _value: TokenAmount,
    ) -> Result<u64, ChainError> {
        self.record("estimate");
        if self.fail_at == FailAt::Estimate {
            return Err(Self::fail("estimate"));
        }
        Ok(100_000)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.record("gas_price");
        if self.fail_at == FailAt::GasPrice {
            return Err(Self::fail("gas_price"));
        }
        Ok(60_000_000)
    }

    async fn broadcast_purchase(
        &self,
        product_ids: &[ProductId],
        _value: TokenAmount,
        _gas_limit: u64,
        _gas_price: u128,
    ) -> Result<String, ChainError> {
        self.record("broadcast");
        if self.fail_at == FailAt::Broadcast {
            return Err(Self::fail("broadcast"));
        }
        Ok(format!("0xdeadbeef{:02x}", product_ids.len()))
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<ChainReceipt, ChainError> {
        self.record("receipt");
        if self.fail_at == FailAt::Receipt {
            return Err(Self::fail("receipt"));
        }
        Ok(ChainReceipt {
            tx_hash: tx_hash.to_string(),
            block_hash: Some("0x6de2".to_string()),
            block_number: Some(4_721_033),
            from: "0xBuyer".to_string(),
            to: Some("0xMarketplace".to_string()),
            gas_used: 84_213,
            cumulative_gas_used: 1_204_213,
            status: self.receipt_status,
        })
    }
}
