//! Background expiry sweeper.
//!
//! Lazy expiry on read already keeps stale values from being served; the sweeper only
//! returns memory held by entries nobody asks for again. It also reports fills that have
//! been pending for an unusually long time, which points at a node call with no timeout.

use std::{fmt::Debug, hash::Hash, sync::Weak};
use tokio::{
    sync::broadcast,
    time::{Duration, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use super::{CacheError, EstimateSize, TtlCache};

/// Fills running longer than this are reported on every sweep.
const STALE_FILL_THRESHOLD: Duration = Duration::from_secs(120);

/// Runs the periodic expiry sweep until shutdown or until the cache is dropped.
pub(crate) async fn run_expiry_sweeper<K, V, E>(
    cache: Weak<TtlCache<K, V, E>>,
    period: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    K: Eq + Hash + Clone + Debug + EstimateSize + Send + Sync + 'static,
    V: Clone + EstimateSize + Send + Sync + 'static,
    E: Clone + From<CacheError> + Send + Sync + 'static,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("cache expiry sweeper shutting down");
                break;
            }
            _ = interval.tick() => {
                let Some(cache) = cache.upgrade() else {
                    debug!("cache dropped, expiry sweeper exiting");
                    break;
                };

                let removed = cache.purge_expired();
                if removed > 0 {
                    debug!(cache = cache.name(), removed = removed, "swept expired cache entries");
                }

                for (key, elapsed) in cache.stale_fills(STALE_FILL_THRESHOLD) {
                    warn!(
                        cache = cache.name(),
                        key = ?key,
                        elapsed_secs = elapsed.as_secs(),
                        "cache fill pending for too long"
                    );
                }
            }
        }
    }
}
