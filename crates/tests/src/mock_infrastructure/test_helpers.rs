//! Test Helper Functions and Utilities
//!
//! Fixed addresses and configurations shared by the integration suites.

use motif_core::{config::AppConfig, Address};

/// ERC20 token contract answering the probe.
pub const TOKEN: &str = "0x1111111111111111111111111111111111111111";
/// Plain account without code.
pub const NOT_A_TOKEN: &str = "0x2222222222222222222222222222222222222222";
/// Token holder.
pub const OWNER: &str = "0x3333333333333333333333333333333333333333";
/// Explicit allowance spender.
pub const SPENDER: &str = "0x4444444444444444444444444444444444444444";

/// Parses a fixture address.
///
/// # Panics
///
/// Panics if `s` is not a valid address literal.
#[must_use]
pub fn addr(s: &str) -> Address {
    s.parse().unwrap_or_else(|e| panic!("invalid fixture address {s}: {e}"))
}

/// The fMint minter address of the default configuration.
#[must_use]
pub fn minter() -> Address {
    addr(&AppConfig::default().defi.fmint_contract)
}

/// Configuration pointing at `node_url` with a short timeout and no background sweeper.
#[must_use]
pub fn node_config(node_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.node.url = node_url.to_string();
    config.node.timeout_seconds = 5;
    config.cache.max_size_mb = 1;
    config.cache.sweep_interval_seconds = 0;
    config
}

/// Like [`node_config`] with a custom TTL and sweep interval, both in seconds.
#[must_use]
pub fn node_config_with_ttl(node_url: &str, ttl_seconds: u64, sweep_seconds: u64) -> AppConfig {
    let mut config = node_config(node_url);
    config.cache.ttl_seconds = ttl_seconds;
    config.cache.sweep_interval_seconds = sweep_seconds;
    config
}
