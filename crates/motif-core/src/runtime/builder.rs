//! Builder pattern for initializing the bridge runtime.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::lifecycle::BridgeRuntime;
use crate::{
    cache::{CacheError, TtlCache},
    config::AppConfig,
    repository::Repository,
    rpc::{HttpTransport, NodeAdapter, RpcError, RpcTransport},
};

/// Errors that can occur during runtime initialization.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// The node transport could not be constructed
    #[error("Failed to initialize node transport: {0}")]
    Transport(#[from] RpcError),

    /// The cache rejected its configuration
    #[error("Failed to initialize cache: {0}")]
    Cache(#[from] CacheError),
}

#[derive(Clone)]
struct RuntimeOptions {
    shutdown_channel_capacity: usize,
    enable_cache_sweeper: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self { shutdown_channel_capacity: 16, enable_cache_sweeper: true }
    }
}

/// Builder for constructing a [`BridgeRuntime`].
///
/// # Examples
///
/// ```no_run
/// # use motif_core::{config::AppConfig, runtime::BridgeRuntimeBuilder};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AppConfig::load()?;
///
/// let runtime = BridgeRuntimeBuilder::new().with_config(config).build()?;
/// let balance = runtime
///     .repository()
///     .account_balance("0x4acb55fe5f0b7c487edec3862079aa36ab054358".parse()?)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct BridgeRuntimeBuilder {
    config: Option<AppConfig>,
    transport: Option<Arc<dyn RpcTransport>>,
    options: RuntimeOptions,
}

impl BridgeRuntimeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self { config: None, transport: None, options: RuntimeOptions::default() }
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses `transport` instead of an [`HttpTransport`] built from `node.url`.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn RpcTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets custom shutdown channel capacity (default: 16).
    #[must_use]
    pub fn with_shutdown_channel_capacity(mut self, capacity: usize) -> Self {
        self.options.shutdown_channel_capacity = capacity.max(1);
        self
    }

    /// Skips the background expiry sweeper regardless of `cache.sweep_interval_seconds`.
    #[must_use]
    pub fn disable_cache_sweeper(mut self) -> Self {
        self.options.enable_cache_sweeper = false;
        self
    }

    /// Builds the runtime and starts its background tasks.
    ///
    /// Must be called from within a tokio runtime when the sweeper is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] if configuration is missing or invalid, or a component
    /// fails to initialize.
    pub fn build(self) -> Result<BridgeRuntime, RuntimeError> {
        let config = self.config.ok_or_else(|| {
            RuntimeError::ConfigValidation("No configuration provided".to_string())
        })?;
        config.validate().map_err(RuntimeError::ConfigValidation)?;

        info!(
            node_url = %config.node.url,
            cache_ttl_seconds = config.cache.ttl_seconds,
            cache_max_size_mb = config.cache.max_size_mb,
            "Initializing bridge runtime"
        );

        let (shutdown_tx, _) = broadcast::channel::<()>(self.options.shutdown_channel_capacity);

        let transport: Arc<dyn RpcTransport> = match self.transport {
            Some(transport) => {
                debug!("Using injected node transport");
                transport
            }
            None => Arc::new(HttpTransport::new(
                config.node.url.clone(),
                config.node_timeout(),
                config.node.concurrent_limit,
            )?),
        };
        let adapter = NodeAdapter::with_namespace(transport, &config.node.method_namespace);

        let cache = Arc::new(TtlCache::new("repository", config.cache_config())?);
        debug!("Repository cache initialized");

        let sweeper = if self.options.enable_cache_sweeper {
            cache.start_background_tasks(&shutdown_tx)
        } else {
            debug!("Cache expiry sweeper disabled");
            None
        };

        let options = config.repository_options().map_err(RuntimeError::ConfigValidation)?;
        let repository = Arc::new(Repository::new(adapter, cache, options));

        info!("Bridge runtime initialization complete");
        Ok(BridgeRuntime::new(repository, shutdown_tx, config, sweeper))
    }
}

impl Default for BridgeRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
