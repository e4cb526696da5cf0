//! Pending-fill bookkeeping for single-flight lookups.
//!
//! A key with a fill in progress has a [`PendingFetch`] entry holding the receiving half
//! of a `watch` channel. The leader's spawned task owns the sender and a [`FetchGuard`];
//! if that task dies before publishing an outcome, the guard's drop removes the pending
//! entry and the dropped sender wakes every waiter with a closed-channel error.

use tokio::{sync::watch, time::Instant};

/// Outcome slot shared by all waiters of one fill. `None` until the fill finishes.
pub(crate) type FillOutcome<V, E> = Option<Result<V, E>>;

/// A fill in progress for one key.
pub(crate) struct PendingFetch<V, E> {
    /// Distinguishes this fill from a later one for the same key.
    pub fetch_id: u64,
    pub receiver: watch::Receiver<FillOutcome<V, E>>,
    pub started_at: Instant,
}

/// RAII guard that runs a cleanup closure unless disarmed.
///
/// The closure captures the cache handle, the key and the fetch id, which keeps the guard
/// itself free of the cache's type parameters.
pub(crate) struct FetchGuard {
    cleanup: Option<Box<dyn FnOnce() + Send>>,
}

impl FetchGuard {
    pub(crate) fn new(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Self { cleanup: Some(Box::new(cleanup)) }
    }

    /// Consumes the guard without running the cleanup.
    pub(crate) fn disarm(mut self) {
        self.cleanup = None;
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            tracing::warn!("cache fill task ended without an outcome, releasing pending entry");
            cleanup();
        }
    }
}
