//! # Metrics
//!
//! Counters are recorded through the `metrics` facade on every node request and cache
//! lookup. Without an installed recorder they are no-ops; binaries that want to expose
//! them call [`install_prometheus_recorder`] once and render the returned handle.
//!
//! | Metric | Labels |
//! |--------|--------|
//! | `motif_rpc_calls_total` | `method`, `outcome` |
//! | `motif_cache_hits_total` | `cache` |
//! | `motif_cache_misses_total` | `cache` |
//! | `motif_cache_coalesced_total` | `cache` |
//! | `motif_cache_evictions_total` | `cache`, `reason` |

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::rpc::RpcErrorKind;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the global Prometheus recorder, or returns the existing handle.
///
/// When another recorder is already installed, a detached recorder is built instead so
/// callers always get a renderable handle.
pub fn install_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install prometheus recorder, using fallback");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Records one node request. `error` is `None` on success.
pub fn record_rpc_call(method: &str, error: Option<RpcErrorKind>) {
    let outcome = error.map_or("success", |kind| kind.as_str());
    counter!("motif_rpc_calls_total", "method" => method.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_cache_hit(cache: &'static str) {
    counter!("motif_cache_hits_total", "cache" => cache).increment(1);
}

pub fn record_cache_miss(cache: &'static str) {
    counter!("motif_cache_misses_total", "cache" => cache).increment(1);
}

/// Records a lookup that joined an in-flight fill instead of issuing its own.
pub fn record_cache_coalesced(cache: &'static str) {
    counter!("motif_cache_coalesced_total", "cache" => cache).increment(1);
}

/// Records removals; `reason` is `"capacity"` or `"expired"`.
pub fn record_cache_eviction(cache: &'static str, reason: &'static str, count: u64) {
    if count > 0 {
        counter!("motif_cache_evictions_total", "cache" => cache, "reason" => reason)
            .increment(count);
    }
}

#[allow(clippy::cast_precision_loss)]
pub fn record_cache_occupancy(cache: &'static str, entries: usize, occupied_bytes: usize) {
    gauge!("motif_cache_entries", "cache" => cache).set(entries as f64);
    gauge!("motif_cache_occupied_bytes", "cache" => cache).set(occupied_bytes as f64);
}
