//! Metrics collection and exposition.
//!
//! # Metrics
//! - `site_headers_cache_hits_total` (counter): resolutions served from cache
//! - `site_headers_cache_misses_total` (counter): resolutions that loaded a site
//! - `site_headers_store_fetches_total` (counter): store lookups by `outcome`
//! - `site_headers_invalidations_total` (counter): full cache clears
//! - `site_headers_matches_total` (counter): resolutions by `matched`
//! - `site_headers_cached_sites` (gauge): sites currently cached

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Start the Prometheus exporter on `addr`. Requires a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_cache_hit() {
    counter!("site_headers_cache_hits_total").increment(1);
}

pub fn record_cache_miss() {
    counter!("site_headers_cache_misses_total").increment(1);
}

/// `outcome` is one of `found`, `not_found`, `error`.
pub fn record_store_fetch(outcome: &'static str) {
    counter!("site_headers_store_fetches_total", "outcome" => outcome).increment(1);
}

pub fn record_invalidation() {
    counter!("site_headers_invalidations_total").increment(1);
}

pub fn record_match(matched: bool) {
    let matched = if matched { "true" } else { "false" };
    counter!("site_headers_matches_total", "matched" => matched).increment(1);
}

pub fn record_cached_sites(count: usize) {
    gauge!("site_headers_cached_sites").set(count as f64);
}
