//! Catalog seeding command.
//!
//! Lists a handful of demo products through the contract, the role the
//! original repo's deployment migrations played.

use agrimarket_core::TokenAmount;
use agrimarket_storefront::chain::MarketplaceClient;
use agrimarket_storefront::config::MarketConfig;

use super::CliError;

/// A pinned sample image reused by every demo product.
const DEMO_IMAGE_CID: &str = "QmYwAPJzv5CZsnAzt8auVZRnuuZvUZta8t6PJ6j2yeQSWC";

/// Demo products: name, description, price in display units.
const DEMO_PRODUCTS: &[(&str, &str, &str)] = &[
    (
        "Heirloom Tomatoes",
        "Sun-ripened heirloom tomatoes, picked this morning.",
        "0.0015",
    ),
    (
        "Raw Wildflower Honey",
        "Unfiltered honey from hives at the edge of the orchard.",
        "0.003",
    ),
    (
        "Free-Range Eggs",
        "A dozen eggs from pasture-raised hens.",
        "0.001",
    ),
    (
        "Cold-Pressed Olive Oil",
        "Single-estate olive oil, pressed within hours of harvest.",
        "0.005",
    ),
    (
        "Sourdough Loaf",
        "Naturally leavened, baked in a wood-fired oven.",
        "0.0008",
    ),
];

/// Create `count` demo products through the contract.
pub async fn run(count: usize) -> Result<(), CliError> {
    if count == 0 || count > DEMO_PRODUCTS.len() {
        return Err(CliError::Invalid(format!(
            "count must be between 1 and {}",
            DEMO_PRODUCTS.len()
        )));
    }

    let config = MarketConfig::from_env()?;
    let market = MarketplaceClient::connect(&config.chain)?;

    for (name, description, price) in DEMO_PRODUCTS.iter().take(count) {
        let price = TokenAmount::from_display_str(price)
            .map_err(|error| CliError::Invalid(format!("bad demo price: {error}")))?;

        println!("Listing '{name}' at {price} tRBTC...");
        let receipt = market
            .create_product(name, description, DEMO_IMAGE_CID, price)
            .await?;
        match receipt.block_number {
            Some(block) => println!("  {} in block {block}", receipt.status),
            None => println!("  {} (block pending)", receipt.status),
        }
    }

    let total = market.product_count().await?;
    println!("Done. The contract now lists {total} products.");
    Ok(())
}
