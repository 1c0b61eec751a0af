//! Observability utilities for the outage notifier.
//!
//! This crate provides:
//! - Prometheus recorder installation, optionally with an HTTP scrape endpoint
//! - `NotifierMetrics` for dispatch cycle counters, gauges and histograms
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, NotifierMetrics};
//!
//! // Install the recorder and serve /metrics on port 9000
//! init_metrics(Some("0.0.0.0:9000".parse()?))?;
//!
//! NotifierMetrics::record_outages_fetched(12);
//! NotifierMetrics::record_dispatch(3, 1, 0, 0);
//! ```

pub mod notifier;

pub use notifier::NotifierMetrics;

// Re-export metrics macros for convenience
pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::net::SocketAddr;
use thiserror::Error;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to build Prometheus exporter: {0}")]
    Build(String),

    #[error("Failed to install metrics recorder: {0}")]
    Install(String),
}

/// Initialize the Prometheus metrics recorder.
///
/// With `listen` set, an HTTP scrape endpoint is spawned on the current
/// Tokio runtime. Later calls return the handle from the first call.
pub fn init_metrics(listen: Option<SocketAddr>) -> Result<&'static PrometheusHandle, MetricsError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = match listen {
            Some(addr) => {
                let (recorder, exporter) = PrometheusBuilder::new()
                    .with_http_listener(addr)
                    .build()
                    .map_err(|e| MetricsError::Build(e.to_string()))?;
                let handle = recorder.handle();
                metrics::set_global_recorder(recorder)
                    .map_err(|e| MetricsError::Install(e.to_string()))?;
                tokio::spawn(exporter);
                info!(addr = %addr, "Prometheus exporter listening");
                handle
            }
            None => PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| MetricsError::Install(e.to_string()))?,
        };

        info!("Prometheus metrics recorder initialized");

        // Register metric descriptions
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Register metric descriptions for documentation
fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_gauge;
    use metrics::describe_histogram;

    describe_counter!(
        "outage_notifications_total",
        "Notification attempts by outcome (sent, blocked, transient)"
    );
    describe_counter!(
        "outage_persistence_failures_total",
        "Subscriber saves or removals that failed during dispatch"
    );
    describe_gauge!(
        "outages_fetched",
        "Deduplicated outages in the most recent fetch"
    );
    describe_histogram!(
        "notifier_cycle_duration_seconds",
        "Fetch and dispatch cycle duration in seconds"
    );
    describe_counter!(
        "notifier_cycles_total",
        "Notifier cycles by status"
    );
}
