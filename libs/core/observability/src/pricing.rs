//! Metrics for catalog lookups and cost estimation.

use metrics::{counter, histogram};
use std::time::Instant;

/// Catalog and estimation metrics recorder
pub struct CatalogMetrics;

impl CatalogMetrics {
    // =========================================================================
    // Cache Metrics
    // =========================================================================

    pub fn record_cache_hit() {
        counter!("pricing_catalog_cache_total", "outcome" => "hit").increment(1);
    }

    pub fn record_cache_miss() {
        counter!("pricing_catalog_cache_total", "outcome" => "miss").increment(1);
    }

    /// A lookup skipped because the filter was rejected earlier in the run
    pub fn record_failed_filter_skip() {
        counter!("pricing_catalog_cache_total", "outcome" => "failed_filter").increment(1);
    }

    // =========================================================================
    // Fetch Metrics
    // =========================================================================

    pub fn record_page_fetched(items: usize) {
        counter!("pricing_catalog_pages_total").increment(1);

        tracing::trace!(items = items, "Catalog page fetched");
    }

    /// Record a fetch error; `kind` is a stable label such as `filter_rejected` or `transport`
    pub fn record_fetch_error(kind: &'static str) {
        counter!("pricing_catalog_errors_total", "kind" => kind).increment(1);
    }

    // =========================================================================
    // Estimation Metrics
    // =========================================================================

    /// Record the outcome of one estimator call (`matched` or `unknown`)
    pub fn record_estimation(resource: &'static str, matched: bool) {
        let outcome = if matched { "matched" } else { "unknown" };
        counter!(
            "pricing_estimations_total",
            "resource" => resource,
            "outcome" => outcome
        )
        .increment(1);
    }
}

/// Timer guard for a complete catalog fetch.
///
/// Records the duration when `stop()` is called or when dropped.
pub struct FetchTimer {
    start: Instant,
    stopped: bool,
}

impl FetchTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Stop the timer and record the duration. Returns duration in milliseconds.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!("pricing_catalog_fetch_duration_seconds").record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for FetchTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}
