//! Observability utilities for the retail price estimator.
//!
//! This crate provides:
//! - Prometheus metrics recording (via the `metrics` facade)
//! - Catalog and estimation metrics used by `domain_pricing`
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, CatalogMetrics};
//!
//! let handle = init_metrics();
//! CatalogMetrics::record_cache_hit();
//! println!("{}", handle.render());
//! ```
//!
//! Recording without [`init_metrics`] is a no-op, which keeps library tests free
//! of global recorder state.

pub mod pricing;

pub use pricing::{CatalogMetrics, FetchTimer};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::{info, warn};

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Returns `None` when another recorder was already installed by someone else.
pub fn init_metrics() -> Option<&'static PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Some(handle);
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            info!("Prometheus metrics recorder initialized");
            register_metric_descriptions();
            Some(METRICS_HANDLE.get_or_init(|| handle))
        }
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Render the current metrics in Prometheus text format
pub fn render_metrics() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    describe_counter!(
        "pricing_catalog_cache_total",
        "Catalog lookups by cache outcome (hit, miss, failed_filter)"
    );
    describe_counter!(
        "pricing_catalog_pages_total",
        "Catalog response pages fetched"
    );
    describe_counter!(
        "pricing_catalog_errors_total",
        "Catalog fetch errors by kind"
    );
    describe_histogram!(
        "pricing_catalog_fetch_duration_seconds",
        "Duration of a complete (all pages) catalog fetch"
    );
    describe_counter!(
        "pricing_estimations_total",
        "Cost estimations by resource and outcome"
    );
}
