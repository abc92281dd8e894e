//! CLI command implementations.

pub mod pin;
pub mod seed;
pub mod status;

use agrimarket_storefront::chain::ChainError;
use agrimarket_storefront::config::ConfigError;
use agrimarket_storefront::pinning::PinningError;
use thiserror::Error;

/// Errors that can occur when running a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Pinning(#[from] PinningError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Invalid(String),
}
