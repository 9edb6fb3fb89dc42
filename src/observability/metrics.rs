//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (requests, latency, in-flight)
//! - Render a Prometheus-compatible scrape body for the admin listener
//!
//! # Metrics
//! - `gateway_requests_total` (counter): total requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_requests_in_flight` (gauge): requests currently being served
//!
//! # Design Decisions
//! - Each engine owns a local recorder; nothing is installed globally
//! - Histogram upkeep runs on a timer owned by the router

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};

/// Interval between histogram upkeep passes.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a router's metrics. Cheap to clone.
#[derive(Clone)]
pub struct MetricsEngine {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl MetricsEngine {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Record a completed request.
    pub fn record_request(&self, method: &str, status: u16, elapsed: Duration) {
        let method = method.to_string();
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            metrics::counter!(
                "gateway_requests_total",
                "method" => method,
                "status" => status.to_string()
            )
            .increment(1);
            metrics::histogram!("gateway_request_duration_seconds").record(elapsed.as_secs_f64());
        });
    }

    /// Publish the current in-flight request count.
    pub fn set_in_flight(&self, count: usize) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            metrics::gauge!("gateway_requests_in_flight").set(count as f64);
        });
    }

    /// Prometheus text exposition.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Drain histogram buckets so they do not grow without bound.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsEngine").finish_non_exhaustive()
    }
}
