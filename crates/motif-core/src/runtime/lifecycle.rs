//! Runtime lifecycle management including background tasks and graceful shutdown.

use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, error, info, warn};

use super::builder::BridgeRuntimeBuilder;
use crate::{cache::CacheStats, config::AppConfig, repository::Repository};

/// Owns the repository and the background tasks that serve it.
///
/// Consumers receive the repository as an `Arc` handle from [`repository`](Self::repository);
/// there is no global accessor. [`shutdown`](Self::shutdown) signals every background task
/// and waits for them.
pub struct BridgeRuntime {
    repository: Arc<Repository>,
    shutdown_tx: broadcast::Sender<()>,
    config: AppConfig,
    sweeper_task: Mutex<Option<JoinHandle<()>>>,
    shutdown_initiated: AtomicBool,
}

impl BridgeRuntime {
    /// Creates a new builder for constructing a `BridgeRuntime`.
    #[must_use]
    pub fn builder() -> BridgeRuntimeBuilder {
        BridgeRuntimeBuilder::new()
    }

    pub(super) fn new(
        repository: Arc<Repository>,
        shutdown_tx: broadcast::Sender<()>,
        config: AppConfig,
        sweeper_task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            repository,
            shutdown_tx,
            config,
            sweeper_task: Mutex::new(sweeper_task),
            shutdown_initiated: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn repository(&self) -> Arc<Repository> {
        Arc::clone(&self.repository)
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.repository.cache_stats()
    }

    #[must_use]
    pub fn has_cache_sweeper(&self) -> bool {
        self.sweeper_task.lock().is_some()
    }

    /// Creates a new shutdown receiver for external shutdown coordination.
    #[must_use]
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    /// Signals all background tasks and waits for them to finish.
    ///
    /// Idempotent: later calls return immediately. Repository handles stay usable after
    /// shutdown; only background maintenance stops.
    pub async fn shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Shutdown already initiated, ignoring duplicate call");
            return;
        }

        info!("Initiating bridge runtime shutdown");

        if self.shutdown_tx.send(()).is_err() {
            debug!("No background task subscribed to shutdown signal");
        }

        let sweeper = self.sweeper_task.lock().take();
        if let Some(task) = sweeper {
            match task.await {
                Ok(()) => debug!("Cache expiry sweeper completed"),
                Err(e) if e.is_cancelled() => debug!("Cache expiry sweeper cancelled"),
                Err(e) => error!(error = %e, "Cache expiry sweeper failed"),
            }
        }

        info!("Bridge runtime shutdown complete");
    }
}
