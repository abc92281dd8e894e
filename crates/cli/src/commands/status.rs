//! Chain status command.

use agrimarket_storefront::chain::MarketplaceClient;
use agrimarket_storefront::config::MarketConfig;

use super::CliError;

/// Print the chain connection status and a marketplace summary.
pub async fn run() -> Result<(), CliError> {
    let config = MarketConfig::from_env()?;
    let market = MarketplaceClient::connect(&config.chain)?;

    println!("RPC endpoint:     {}", config.chain.rpc_url);
    println!("Contract address: {}", config.chain.contract_address);

    let chain_id = market.chain_id().await?;
    println!("Chain id:         {chain_id}");

    match market.account() {
        Some(account) => println!("Active account:   {account}"),
        None => println!("Active account:   (read-only, no signing key)"),
    }

    let count = market.product_count().await?;
    println!("Products listed:  {count}");

    Ok(())
}
