//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARKET_CONTRACT_ADDRESS` - Address of the deployed Marketplace contract
//! - `PINATA_API_KEY` - Pinning service API key
//! - `PINATA_SECRET_API_KEY` - Pinning service secret API key
//!
//! ## Optional
//! - `MARKET_HOST` - Bind address (default: 127.0.0.1)
//! - `MARKET_PORT` - Listen port (default: 3000)
//! - `CHAIN_RPC_URL` - JSON-RPC endpoint (default: the public RSK testnet node)
//! - `CHAIN_PRIVATE_KEY` - Hex-encoded signing key; without it the
//!   storefront runs read-only and write operations are refused
//! - `CHAIN_RECEIPT_POLL_MS` - Receipt polling interval (default: 15000)
//! - `PINATA_GATEWAY_URL` - Gateway base for rendering pinned images
//!   (default: <https://gateway.pinata.cloud>)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use alloy::primitives::Address;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default JSON-RPC endpoint: the public RSK testnet node the original
/// deployment targeted.
pub const DEFAULT_RPC_URL: &str = "https://public-node.testnet.rsk.co";

/// Default gateway for rendering pinned content.
pub const DEFAULT_GATEWAY_URL: &str = "https://gateway.pinata.cloud";

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Chain and marketplace contract configuration
    pub chain: ChainConfig,
    /// Pinning service configuration
    pub pinning: PinningConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Chain access configuration.
///
/// Implements `Debug` manually to redact the signing key.
#[derive(Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL
    pub rpc_url: Url,
    /// Address of the deployed Marketplace contract
    pub contract_address: Address,
    /// Hex-encoded signing key; `None` means read-only mode
    pub private_key: Option<SecretString>,
    /// Interval between receipt polls after a broadcast
    pub receipt_poll_interval: Duration,
}

impl std::fmt::Debug for ChainConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainConfig")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("contract_address", &self.contract_address)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("receipt_poll_interval", &self.receipt_poll_interval)
            .finish()
    }
}

/// Pinning service configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct PinningConfig {
    /// API key header value
    pub api_key: String,
    /// Secret API key header value
    pub secret_api_key: SecretString,
    /// Gateway base URL for rendering pinned content
    pub gateway_url: String,
}

impl std::fmt::Debug for PinningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningConfig")
            .field("api_key", &self.api_key)
            .field("secret_api_key", &"[REDACTED]")
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

impl MarketConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("MARKET_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MARKET_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("MARKET_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MARKET_PORT".to_string(), e.to_string()))?;

        let chain = ChainConfig::from_env()?;
        let pinning = PinningConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            chain,
            pinning,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ChainConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = get_env_or_default("CHAIN_RPC_URL", DEFAULT_RPC_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("CHAIN_RPC_URL".to_string(), e.to_string()))?;

        let contract_address = get_required_env("MARKET_CONTRACT_ADDRESS")?
            .parse::<Address>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("MARKET_CONTRACT_ADDRESS".to_string(), e.to_string())
            })?;

        // The signing key is optional: reads must keep working without one.
        let private_key = match get_optional_env("CHAIN_PRIVATE_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "CHAIN_PRIVATE_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };

        let receipt_poll_interval = get_env_or_default("CHAIN_RECEIPT_POLL_MS", "15000")
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CHAIN_RECEIPT_POLL_MS".to_string(), e.to_string())
            })?;

        Ok(Self {
            rpc_url,
            contract_address,
            private_key,
            receipt_poll_interval,
        })
    }
}

impl PinningConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_env("PINATA_API_KEY")?,
            secret_api_key: get_validated_secret("PINATA_SECRET_API_KEY")?,
            gateway_url: get_env_or_default("PINATA_GATEWAY_URL", DEFAULT_GATEWAY_URL),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the real key."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_secret_strength_accepts_hex_key() {
        // A random hex key (the usual shape of CHAIN_PRIVATE_KEY)
        let result = validate_secret_strength(
            "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
            "CHAIN_PRIVATE_KEY",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = MarketConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            chain: ChainConfig {
                rpc_url: DEFAULT_RPC_URL.parse().unwrap(),
                contract_address: Address::ZERO,
                private_key: None,
                receipt_poll_interval: Duration::from_millis(15000),
            },
            pinning: PinningConfig {
                api_key: "key".to_string(),
                secret_api_key: SecretString::from("shhh"),
                gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_chain_config_debug_redacts_key() {
        let config = ChainConfig {
            rpc_url: DEFAULT_RPC_URL.parse().unwrap(),
            contract_address: Address::ZERO,
            private_key: Some(SecretString::from("super_secret_signing_key")),
            receipt_poll_interval: Duration::from_millis(15000),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key"));
    }

    #[test]
    fn test_pinning_config_debug_redacts_secret() {
        let config = PinningConfig {
            api_key: "public_key_value".to_string(),
            secret_api_key: SecretString::from("super_secret_pinning_key"),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("public_key_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_pinning_key"));
    }
}
