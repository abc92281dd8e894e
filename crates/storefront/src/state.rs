//! Application state shared across handlers.

use std::sync::Arc;

use crate::chain::MarketplaceClient;
use crate::config::MarketConfig;
use crate::pinning::PinningClient;
use crate::store::MarketStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the chain and pinning clients, and the market store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: MarketConfig,
    market: Option<MarketplaceClient>,
    chain_error: Option<String>,
    pinning: PinningClient,
    store: MarketStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// A chain client that cannot be built is not fatal: the storefront
    /// still serves, pages show the error, and only chain-backed
    /// operations are unavailable.
    #[must_use]
    pub fn new(config: MarketConfig) -> Self {
        let (market, chain_error) = match MarketplaceClient::connect(&config.chain) {
            Ok(market) => (Some(market), None),
            Err(error) => {
                tracing::error!(%error, "chain client unavailable");
                (None, Some(error.to_string()))
            }
        };
        let pinning = PinningClient::new(&config.pinning);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                market,
                chain_error,
                pinning,
                store: MarketStore::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.inner.config
    }

    /// Get the marketplace client, when one could be built.
    #[must_use]
    pub fn market(&self) -> Option<&MarketplaceClient> {
        self.inner.market.as_ref()
    }

    /// The startup chain error, when the client could not be built.
    #[must_use]
    pub fn chain_error(&self) -> Option<&str> {
        self.inner.chain_error.as_deref()
    }

    /// Get a reference to the pinning client.
    #[must_use]
    pub fn pinning(&self) -> &PinningClient {
        &self.inner.pinning
    }

    /// Get a reference to the market store.
    #[must_use]
    pub fn store(&self) -> &MarketStore {
        &self.inner.store
    }
}
