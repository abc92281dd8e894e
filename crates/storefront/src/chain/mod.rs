//! Marketplace chain access over JSON-RPC.
//!
//! # Architecture
//!
//! - Typed contract bindings generated with `alloy`'s `sol!` macro
//! - The chain is source of truth - NO local sync, direct contract calls
//! - In-memory caching via `moka` for catalog reads (60 second TTL,
//!   invalidated by product creation)
//!
//! # Wallet
//!
//! The browser-wallet flow of the original front-end has no headless
//! equivalent, so signing uses an optional local key (`CHAIN_PRIVATE_KEY`).
//! Without one the provider is read-only: catalog loads keep working and
//! write operations fail with [`ChainError::WalletUnavailable`].
//!
//! # Example
//!
//! ```rust,ignore
//! use agrimarket_storefront::chain::MarketplaceClient;
//!
//! let market = MarketplaceClient::connect(&config.chain)?;
//!
//! // Read the catalog (per-item failures captured, not fatal)
//! let load = market.catalog().await?;
//!
//! // List a product
//! market
//!     .create_product("Heirloom Tomatoes", "Sun-ripened", "Qm...", price)
//!     .await?;
//! ```

mod marketplace;

pub use marketplace::{CatalogLoad, MarketplaceClient};

use agrimarket_core::TxStatus;
use thiserror::Error;

/// Errors that can occur when interacting with the chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// JSON-RPC transport failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] alloy::transports::TransportError),

    /// A contract call or send failed (including estimation reverts).
    #[error("contract error: {0}")]
    Contract(#[from] alloy::contract::Error),

    /// No signing key is configured; write operations are unavailable.
    #[error("wallet not configured; write operations are unavailable")]
    WalletUnavailable,

    /// The chain configuration could not be used to build a client.
    #[error("chain configuration error: {0}")]
    Config(String),

    /// A transaction hash string could not be parsed.
    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),

    /// An on-chain value does not fit the domain type.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

/// Chain-agnostic summary of a confirmed transaction receipt.
///
/// Hashes and addresses are carried as display strings so that the rest of
/// the application (and its tests) never touch provider types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReceipt {
    /// Hash of the transaction.
    pub tx_hash: String,
    /// Hash of the containing block, if reported.
    pub block_hash: Option<String>,
    /// Number of the containing block, if reported.
    pub block_number: Option<u64>,
    /// Sender account.
    pub from: String,
    /// Recipient account.
    pub to: Option<String>,
    /// Gas consumed by this transaction.
    pub gas_used: u64,
    /// Cumulative gas consumed in the block up to this transaction.
    pub cumulative_gas_used: u64,
    /// Execution status.
    pub status: TxStatus,
}
