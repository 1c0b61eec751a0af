//! Notifier cycle metrics.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Notifier metrics recorder
pub struct NotifierMetrics;

impl NotifierMetrics {
    /// Record the outcome counts of one dispatch pass
    pub fn record_dispatch(
        sent: usize,
        blocked: usize,
        transient: usize,
        persistence_failures: usize,
    ) {
        counter!("outage_notifications_total", "outcome" => "sent").increment(sent as u64);
        counter!("outage_notifications_total", "outcome" => "blocked").increment(blocked as u64);
        counter!("outage_notifications_total", "outcome" => "transient")
            .increment(transient as u64);
        counter!("outage_persistence_failures_total").increment(persistence_failures as u64);
    }

    /// Set the number of deduplicated outages in the latest fetch
    pub fn record_outages_fetched(count: usize) {
        gauge!("outages_fetched").set(count as f64);
    }

    /// Record a finished cycle
    pub fn record_cycle(duration: Duration, success: bool) {
        let status = if success { "completed" } else { "failed" };
        counter!("notifier_cycles_total", "status" => status).increment(1);
        histogram!("notifier_cycle_duration_seconds", "status" => status)
            .record(duration.as_secs_f64());

        tracing::debug!(
            status,
            duration_ms = duration.as_millis() as u64,
            "Recorded notifier cycle"
        );
    }
}
