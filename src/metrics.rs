/// Metrics and telemetry for the reels feed
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Storage query counts and latencies
/// - Recorded activities
/// - Comment author join failures

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder,
    HistogramTimer, HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    /// Storage queries by operation
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_db_queries_total",
        "Total number of storage queries",
        &["operation"]
    )
    .unwrap();

    /// Storage query duration in seconds
    pub static ref DB_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "feed_db_query_duration_seconds",
        "Storage query latencies in seconds",
        &["operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]
    )
    .unwrap();

    /// Activities appended to the log, by type
    pub static ref ACTIVITIES_RECORDED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "feed_activities_recorded_total",
        "Total number of activity log entries written",
        &["activity_type"]
    )
    .unwrap();

    /// Comments whose author profile could not be resolved
    pub static ref JOIN_INCONSISTENCIES_TOTAL: IntCounter = register_int_counter!(
        "feed_join_inconsistencies_total",
        "Comments returned without a resolvable author profile"
    )
    .unwrap();
}

/// Count a storage query and time it until the returned timer drops
pub fn track_query(operation: &str) -> HistogramTimer {
    DB_QUERIES_TOTAL.with_label_values(&[operation]).inc();
    DB_QUERY_DURATION_SECONDS
        .with_label_values(&[operation])
        .start_timer()
}

pub fn record_activity(activity_type: &str) {
    ACTIVITIES_RECORDED_TOTAL
        .with_label_values(&[activity_type])
        .inc();
}

pub fn record_join_inconsistency() {
    JOIN_INCONSISTENCIES_TOTAL.inc();
}

/// Render all metrics in Prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
