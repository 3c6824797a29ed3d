//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Bleeparr server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Dispatcher and queue state (collected dynamically)
//! - Core queue and job metrics, registered from `bleeparr_core::metrics`

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bleeparr_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bleeparr_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bleeparr_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Dispatcher Metrics (collected dynamically)
// =============================================================================

/// Dispatcher running state (1 = running, 0 = stopped).
pub static DISPATCHER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bleeparr_dispatcher_running",
        "Whether the dispatcher is running (1) or stopped (0)",
    )
    .expect("valid metric definition")
});

/// Live queue items by state.
pub static QUEUE_ITEMS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("bleeparr_queue_items", "Current queue items by state"),
        &["state"], // "queued", "processing"
    )
    .expect("valid metric definition")
});

/// Records held in the processing history.
pub static HISTORY_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bleeparr_history_records",
        "Number of records in the processing history",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(DISPATCHER_RUNNING.clone()),
        Box::new(QUEUE_ITEMS.clone()),
        Box::new(HISTORY_RECORDS.clone()),
    ];

    // Core metrics (queue admission, jobs)
    for metric in metrics.into_iter().chain(bleeparr_core::metrics::all_metrics()) {
        if let Err(e) = registry.register(metric) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the gauges reflect the live queue and dispatcher.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let orchestrator = state.orchestrator();
    DISPATCHER_RUNNING.set(i64::from(orchestrator.is_running()));

    let counts = orchestrator.queue().counts();
    QUEUE_ITEMS
        .with_label_values(&["queued"])
        .set(counts.queued as i64);
    QUEUE_ITEMS
        .with_label_values(&["processing"])
        .set(counts.processing as i64);

    HISTORY_RECORDS.set(orchestrator.history().len() as i64);
}

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("valid path regex"));

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    if !path.starts_with("/api") && path != "/metrics" {
        // Dashboard assets would blow up label cardinality.
        return "/static".to_string();
    }
    NUMERIC_SEGMENT.replace_all(path, "/{id}$1").to_string()
}
