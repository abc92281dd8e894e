//! Marketplace contract client implementation.
//!
//! Wraps the `sol!`-generated bindings behind domain types and caches
//! catalog reads with `moka`.

use std::time::Duration;

use agrimarket_core::{Product, ProductId, TokenAmount, TxStatus};
use alloy::consensus::TxReceipt as _;
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use moka::future::Cache;
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::checkout::PurchaseGateway;
use crate::config::ChainConfig;

use super::{ChainError, ChainReceipt};

sol! {
    #[sol(rpc)]
    contract Marketplace {
        function productCount() external view returns (uint256);

        function products(uint256 productId)
            external
            view
            returns (
                uint256 id,
                string memory name,
                string memory description,
                string memory imageHash,
                uint256 price
            );

        function createProduct(
            string memory name,
            string memory description,
            string memory imageHash,
            uint256 price
        ) external;

        function purchaseProducts(uint256[] memory productIds) external payable;
    }
}

/// Catalog reads are cached under a single key.
const CATALOG_KEY: &str = "catalog";

/// How long a catalog read stays fresh.
const CATALOG_TTL: Duration = Duration::from_secs(60);

/// Result of a full catalog load.
///
/// Products are fetched one by one; a failing item is captured in
/// `missing` instead of aborting the remaining fetches.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoad {
    /// Products that loaded successfully, in id order.
    pub products: Vec<Product>,
    /// Ids that failed to load, with the failure message.
    pub missing: Vec<(u64, String)>,
}

/// Client for the deployed Marketplace contract.
///
/// Cheaply cloneable; catalog reads are cached for [`CATALOG_TTL`].
#[derive(Clone)]
pub struct MarketplaceClient {
    provider: DynProvider,
    contract: Marketplace::MarketplaceInstance<DynProvider>,
    account: Option<Address>,
    catalog_cache: Cache<&'static str, CatalogLoad>,
    receipt_poll_interval: Duration,
}

impl MarketplaceClient {
    /// Build a client from chain configuration.
    ///
    /// With a signing key the provider carries a local wallet and the
    /// signer's address becomes the active account; without one the
    /// provider is read-only.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Config`] if the signing key cannot be parsed.
    pub fn connect(config: &ChainConfig) -> Result<Self, ChainError> {
        let (provider, account) = match &config.private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key
                    .expose_secret()
                    .trim()
                    .parse()
                    .map_err(|_| ChainError::Config("invalid signing key".to_string()))?;
                let account = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(config.rpc_url.clone())
                    .erased();
                (provider, Some(account))
            }
            None => {
                let provider = ProviderBuilder::new()
                    .connect_http(config.rpc_url.clone())
                    .erased();
                (provider, None)
            }
        };

        let contract = Marketplace::new(config.contract_address, provider.clone());
        let catalog_cache = Cache::builder()
            .max_capacity(4)
            .time_to_live(CATALOG_TTL)
            .build();

        Ok(Self {
            provider,
            contract,
            account,
            catalog_cache,
            receipt_poll_interval: config.receipt_poll_interval,
        })
    }

    /// The active account, when a signing key is configured.
    #[must_use]
    pub const fn account(&self) -> Option<Address> {
        self.account
    }

    /// Chain id reported by the node.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC request fails.
    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.provider.get_chain_id().await?)
    }

    /// Number of products ever listed on the contract.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the count exceeds `u64`.
    #[instrument(skip(self))]
    pub async fn product_count(&self) -> Result<u64, ChainError> {
        let count = self.contract.productCount().call().await?;
        u64::try_from(count)
            .map_err(|_| ChainError::OutOfRange("product count exceeds u64".to_string()))
    }

    /// Fetch a single product by its one-based id.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or a field does not fit the
    /// domain types.
    #[instrument(skip(self))]
    pub async fn product(&self, id: u64) -> Result<Product, ChainError> {
        let raw = self.contract.products(U256::from(id)).call().await?;
        convert_product(raw)
    }

    /// Load the full catalog: `productCount`, then each id in
    /// `1..=count` with per-item failure capture.
    ///
    /// Loads are cached; [`Self::create_product`] invalidates the cache so
    /// a just-listed product shows up on the next read.
    ///
    /// # Errors
    ///
    /// Returns an error only if the count itself cannot be read; per-item
    /// failures end up in [`CatalogLoad::missing`].
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<CatalogLoad, ChainError> {
        if let Some(hit) = self.catalog_cache.get(CATALOG_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(hit);
        }

        let count = self.product_count().await?;
        let mut results = Vec::with_capacity(usize::try_from(count).unwrap_or(0));
        for id in 1..=count {
            results.push((id, self.product(id).await));
        }
        let load = collect_catalog(results);

        self.catalog_cache.insert(CATALOG_KEY, load.clone()).await;
        Ok(load)
    }

    /// List a new product and wait for its receipt.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::WalletUnavailable`] without a signing key, or
    /// a contract/RPC error if the send fails.
    #[instrument(skip(self, description))]
    pub async fn create_product(
        &self,
        name: &str,
        description: &str,
        image_cid: &str,
        price: TokenAmount,
    ) -> Result<ChainReceipt, ChainError> {
        let account = self.account.ok_or(ChainError::WalletUnavailable)?;
        let gas_price = self.provider.get_gas_price().await?;

        let pending = self
            .contract
            .createProduct(
                name.to_string(),
                description.to_string(),
                image_cid.to_string(),
                U256::from(price.base_units()),
            )
            .from(account)
            .gas_price(gas_price)
            .send()
            .await?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "createProduct broadcast");

        let receipt = self.receipt_by_hash(tx_hash).await?;
        // A freshly listed product must show up on the next catalog read.
        self.catalog_cache.invalidate(CATALOG_KEY).await;
        Ok(receipt)
    }

    /// Poll for the receipt of a broadcast transaction.
    ///
    /// There is deliberately no overall timeout: an attempt stays pending
    /// until the node answers, and a new attempt requires a new user
    /// action.
    async fn receipt_by_hash(&self, tx_hash: TxHash) -> Result<ChainReceipt, ChainError> {
        loop {
            if let Some(receipt) = self.provider.get_transaction_receipt(tx_hash).await? {
                return Ok(convert_receipt(&receipt));
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

#[async_trait]
impl PurchaseGateway for MarketplaceClient {
    async fn estimate_purchase(
        &self,
        product_ids: &[ProductId],
        value: TokenAmount,
    ) -> Result<u64, ChainError> {
        let account = self.account.ok_or(ChainError::WalletUnavailable)?;
        let ids = to_contract_ids(product_ids);
        let gas = self
            .contract
            .purchaseProducts(ids)
            .from(account)
            .value(U256::from(value.base_units()))
            .estimate_gas()
            .await?;
        Ok(gas)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn broadcast_purchase(
        &self,
        product_ids: &[ProductId],
        value: TokenAmount,
        gas_limit: u64,
        gas_price: u128,
    ) -> Result<String, ChainError> {
        let account = self.account.ok_or(ChainError::WalletUnavailable)?;
        let ids = to_contract_ids(product_ids);
        let pending = self
            .contract
            .purchaseProducts(ids)
            .from(account)
            .value(U256::from(value.base_units()))
            .gas(gas_limit)
            .gas_price(gas_price)
            .send()
            .await?;
        Ok(pending.tx_hash().to_string())
    }

    async fn wait_for_receipt(&self, tx_hash: &str) -> Result<ChainReceipt, ChainError> {
        let hash: TxHash = tx_hash
            .parse()
            .map_err(|_| ChainError::InvalidTxHash(tx_hash.to_string()))?;
        self.receipt_by_hash(hash).await
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn to_contract_ids(product_ids: &[ProductId]) -> Vec<U256> {
    product_ids.iter().map(|id| U256::from(id.as_u64())).collect()
}

fn convert_product(raw: Marketplace::productsReturn) -> Result<Product, ChainError> {
    let id = u64::try_from(raw.id)
        .map_err(|_| ChainError::OutOfRange("product id exceeds u64".to_string()))?;
    let price = u128::try_from(raw.price)
        .map_err(|_| ChainError::OutOfRange(format!("price of product {id} exceeds u128")))?;

    Ok(Product {
        id: ProductId::new(id),
        name: raw.name,
        description: raw.description,
        image_cid: raw.imageHash,
        price: TokenAmount::from_base_units(price),
    })
}

fn convert_receipt(receipt: &TransactionReceipt) -> ChainReceipt {
    ChainReceipt {
        tx_hash: receipt.transaction_hash.to_string(),
        block_hash: receipt.block_hash.map(|hash| hash.to_string()),
        block_number: receipt.block_number,
        from: receipt.from.to_string(),
        to: receipt.to.map(|address| address.to_string()),
        gas_used: receipt.gas_used.try_into().unwrap_or(u64::MAX),
        cumulative_gas_used: receipt
            .inner
            .cumulative_gas_used()
            .try_into()
            .unwrap_or(u64::MAX),
        status: TxStatus::from(receipt.status()),
    }
}

/// Fold per-item fetch results into a [`CatalogLoad`].
///
/// A failing item is recorded and skipped so one bad listing cannot hide
/// the rest of the catalog.
fn collect_catalog(results: Vec<(u64, Result<Product, ChainError>)>) -> CatalogLoad {
    let mut load = CatalogLoad::default();
    for (id, result) in results {
        match result {
            Ok(product) => load.products.push(product),
            Err(error) => {
                tracing::warn!(id, %error, "product failed to load");
                load.missing.push((id, error.to_string()));
            }
        }
    }
    load
}

#[cfg(test)]
mod tests {
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

    #[test]
    fn test_collect_catalog_isolates_per_item_failures() {
        let results = vec![
            (1, Ok(product(1))),
            (
                2,
                Err(ChainError::OutOfRange("price of product 2 exceeds u128".to_string())),
            ),
            (3, Ok(product(3))),
        ];

        let load = collect_catalog(results);

        let loaded: Vec<u64> = load.products.iter().map(|p| p.id.as_u64()).collect();
        assert_eq!(loaded, vec![1, 3]);
        assert_eq!(load.missing.len(), 1);
        assert_eq!(load.missing.first().map(|(id, _)| *id), Some(2));
    }

    #[test]
    fn test_collect_catalog_empty() {
        let load = collect_catalog(Vec::new());
        assert!(load.products.is_empty());
        assert!(load.missing.is_empty());
    }

    #[test]
    fn test_to_contract_ids_preserves_order_and_duplicates() {
        let ids = [ProductId::new(2), ProductId::new(1), ProductId::new(2)];
        let raw = to_contract_ids(&ids);
        assert_eq!(raw, vec![U256::from(2), U256::from(1), U256::from(2)]);
    }
}
