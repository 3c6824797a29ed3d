//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Queue admission (enqueued, rejected, depth)
//! - Job execution (completions, duration)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Queue Metrics
// =============================================================================

/// Jobs accepted into the queue by item type.
pub static JOBS_ENQUEUED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bleeparr_jobs_enqueued_total", "Total jobs accepted into the queue"),
        &["item_type"], // "show", "movie"
    )
    .expect("valid metric definition")
});

/// Enqueue attempts turned away, by reason code.
pub static ENQUEUE_REJECTED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "bleeparr_enqueue_rejected_total",
            "Total enqueue attempts that were rejected",
        ),
        &["reason"],
    )
    .expect("valid metric definition")
});

/// Items currently queued or processing.
pub static QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "bleeparr_queue_depth",
        "Number of queued or processing items",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Job Metrics
// =============================================================================

/// Jobs finished, by result.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("bleeparr_jobs_completed_total", "Total jobs finished"),
        &["result"], // "success", "failed"
    )
    .expect("valid metric definition")
});

/// Time spent censoring a single file.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "bleeparr_job_duration_seconds",
            "Duration of censor jobs",
        )
        .buckets(vec![
            1.0, 10.0, 30.0, 60.0, 300.0, 600.0, 1200.0, 1800.0, 3600.0, 7200.0,
        ]),
        &["result"],
    )
    .expect("valid metric definition")
});

// =============================================================================
// Helper functions
// =============================================================================

/// Records a finished job.
pub fn record_job(success: bool, duration_secs: f64) {
    let result = if success { "success" } else { "failed" };
    JOBS_COMPLETED.with_label_values(&[result]).inc();
    JOB_DURATION
        .with_label_values(&[result])
        .observe(duration_secs);
}

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_ENQUEUED.clone()),
        Box::new(ENQUEUE_REJECTED.clone()),
        Box::new(QUEUE_DEPTH.clone()),
        Box::new(JOBS_COMPLETED.clone()),
        Box::new(JOB_DURATION.clone()),
    ]
}
