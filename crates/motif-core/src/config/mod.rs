//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `set_default` calls and struct `Default` implementations
//! 2. **Config file**: TOML file specified by the `MOTIF_CONFIG` env var
//! 3. **Environment variables**: `MOTIF__*` env vars override specific fields
//!
//! # Configuration Sections
//!
//! - [`NodeConfig`]: full node endpoint, timeout and method namespace
//! - [`CacheConfig`]: TTL, size budget and sweep interval
//! - [`DefiConfig`]: fMint contract addresses, trusted as configured
//! - [`TokensConfig`]: token logo table
//! - [`LoggingConfig`]: log level and format
//!
//! # Example
//!
//! ```toml
//! [node]
//! url = "http://127.0.0.1:18545"
//! timeout_seconds = 30
//!
//! [cache]
//! ttl_seconds = 900
//! max_size_mb = 4096
//!
//! [tokens.logos]
//! "0x04068da6c83afcfa0e13ba15a6696662335d5b75" = "https://example.org/usdc.png"
//! ```

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path, time::Duration};

use crate::{
    cache::TtlCacheConfig,
    defi::DefiAddresses,
    repository::{RepositoryOptions, TokenLogos},
    rpc::DEFAULT_NAMESPACE,
    types::Address,
};

/// Logo served for tokens without an entry in `tokens.logos`.
pub const DEFAULT_TOKEN_LOGO: &str = "https://i.ibb.co/RNLvGqm/symbol.png";

/// Full node connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint of the node. Defaults to `http://127.0.0.1:18545`.
    pub url: String,

    /// Per-request timeout in seconds. Defaults to `30`.
    pub timeout_seconds: u64,

    /// Maximum number of requests in flight. Defaults to `1000`.
    pub concurrent_limit: usize,

    /// Method prefix of the node API (`ftm_getBalance`). Defaults to `"ftm"`.
    pub method_namespace: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18545".to_string(),
            timeout_seconds: 30,
            concurrent_limit: 1000,
            method_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Repository cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds. Must be greater than 0. Defaults to `900`.
    pub ttl_seconds: u64,

    /// Size budget in megabytes. Must be greater than 0. Defaults to `4096`.
    pub max_size_mb: usize,

    /// Background expiry sweep period in seconds, `0` disables it. Defaults to `60`.
    pub sweep_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 900, max_size_mb: 4096, sweep_interval_seconds: 60 }
    }
}

/// fMint DeFi module contract addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefiConfig {
    pub fmint_contract: String,
    pub fmint_address_provider: String,
    pub fmint_token_registry: String,
    pub fmint_reward_distribution: String,
    pub fmint_collateral_pool: String,
    pub fmint_debt_pool: String,
    pub price_oracle_aggregate: String,
}

impl Default for DefiConfig {
    fn default() -> Self {
        Self {
            fmint_contract: "0x4acb55fe5f0b7c487edec3862079aa36ab054358".to_string(),
            fmint_address_provider: "0xdeec401e448d5d9132eb79ac84eb3f212d7759fb".to_string(),
            fmint_token_registry: "0x60092e344c63c6628ec77926e508f9a9c80553ef".to_string(),
            fmint_reward_distribution: "0x0039597eb5aa5760e8db15fbe525e56aa661ef26".to_string(),
            fmint_collateral_pool: "0x6d5f2f2e391f47a1075df4d39a24286c63c0e70c".to_string(),
            fmint_debt_pool: "0xe2d1105f35649bf16deebccec1f2100dcb9aadf5".to_string(),
            price_oracle_aggregate: "0xA1EA42f737bb2E09b0AE4DE001eE06e3BC484fE5".to_string(),
        }
    }
}

impl DefiConfig {
    /// Parses every configured address.
    ///
    /// # Errors
    ///
    /// Returns the name of the first field that is not a valid address.
    pub fn resolve(&self) -> Result<DefiAddresses, String> {
        let parse = |name: &str, value: &str| {
            value.parse::<Address>().map_err(|e| format!("Invalid defi.{name} address {value}: {e}"))
        };
        Ok(DefiAddresses {
            fmint_contract: parse("fmint_contract", &self.fmint_contract)?,
            fmint_address_provider: parse("fmint_address_provider", &self.fmint_address_provider)?,
            fmint_token_registry: parse("fmint_token_registry", &self.fmint_token_registry)?,
            fmint_reward_distribution: parse(
                "fmint_reward_distribution",
                &self.fmint_reward_distribution,
            )?,
            fmint_collateral_pool: parse("fmint_collateral_pool", &self.fmint_collateral_pool)?,
            fmint_debt_pool: parse("fmint_debt_pool", &self.fmint_debt_pool)?,
            price_oracle_aggregate: parse("price_oracle_aggregate", &self.price_oracle_aggregate)?,
        })
    }
}

/// Token metadata that is not read from the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokensConfig {
    /// Token address to logo URL.
    pub logos: HashMap<String, String>,

    /// Fallback logo URL.
    pub default_logo: String,
}

impl Default for TokensConfig {
    fn default() -> Self {
        Self { logos: HashMap::new(), default_logo: DEFAULT_TOKEN_LOGO.to_string() }
    }
}

impl TokensConfig {
    /// # Errors
    ///
    /// Returns an error string for the first key that is not a valid address.
    pub fn resolve(&self) -> Result<TokenLogos, String> {
        let logos = self
            .logos
            .iter()
            .map(|(token, url)| {
                token
                    .parse::<Address>()
                    .map(|address| (address, url.clone()))
                    .map_err(|e| format!("Invalid token logo address {token}: {e}"))
            })
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(TokenLogos { logos, default_logo: self.default_logo.clone() })
    }
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (e.g., "trace", "debug", "info", "warn", "error"). Defaults to `"info"`.
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string() }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub node: NodeConfig,
    pub cache: CacheConfig,
    pub defi: DefiConfig,
    pub tokens: TokensConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Use `__` as a separator for nested fields (e.g., `MOTIF__NODE__URL=http://node:18545`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_builder = Config::builder()
            .set_default("node.url", "http://127.0.0.1:18545")?
            .set_default("node.timeout_seconds", 30)?
            .set_default("node.concurrent_limit", 1000)?
            .set_default("node.method_namespace", DEFAULT_NAMESPACE)?
            .set_default("cache.ttl_seconds", 900)?
            .set_default("cache.max_size_mb", 4096)?
            .set_default("cache.sweep_interval_seconds", 60)?
            .set_default("tokens.default_logo", DEFAULT_TOKEN_LOGO)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("MOTIF").separator("__"))
            .build()?;

        config_builder.try_deserialize()
    }

    /// Loads configuration from `config/config.toml` with fallback to defaults.
    ///
    /// The config file path can be overridden using the `MOTIF_CONFIG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("MOTIF_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the per-request node timeout as a [`Duration`].
    #[must_use]
    pub fn node_timeout(&self) -> Duration {
        Duration::from_secs(self.node.timeout_seconds)
    }

    /// Cache policy derived from the `cache` section.
    #[must_use]
    pub fn cache_config(&self) -> TtlCacheConfig {
        TtlCacheConfig {
            default_ttl: Duration::from_secs(self.cache.ttl_seconds),
            max_size_bytes: self.cache.max_size_mb.saturating_mul(1024 * 1024),
            sweep_interval: Duration::from_secs(self.cache.sweep_interval_seconds),
        }
    }

    /// Resolves the static repository inputs.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if an address does not parse.
    pub fn repository_options(&self) -> Result<RepositoryOptions, String> {
        Ok(RepositoryOptions {
            defi: self.defi.resolve()?,
            token_logos: self.tokens.resolve()?,
            ttl: None,
        })
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// Checks include:
    /// - The node URL is an HTTP(S) URL
    /// - Timeouts, limits and cache sizes are greater than zero
    /// - Every configured address parses
    /// - Logging format is either `"json"` or `"pretty"`
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if !self.node.url.starts_with("http://") && !self.node.url.starts_with("https://") {
            return Err(format!("Invalid node URL: {}", self.node.url));
        }

        if self.node.timeout_seconds == 0 {
            return Err("Node timeout must be greater than 0".to_string());
        }

        if self.node.concurrent_limit == 0 {
            return Err("Node concurrent limit must be greater than 0".to_string());
        }

        if self.node.method_namespace.is_empty() {
            return Err("Node method namespace must not be empty".to_string());
        }

        if self.cache.ttl_seconds == 0 {
            return Err("Cache TTL must be greater than 0".to_string());
        }

        if self.cache.max_size_mb == 0 {
            return Err("Cache max size must be greater than 0".to_string());
        }

        self.defi.resolve()?;
        self.tokens.resolve()?;

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
