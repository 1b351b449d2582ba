//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Frame outcomes (processed, dropped by the gate, failed, discarded)
//! - Detector latency histogram
//! - Alert decisions and notifier delivery results
//! - Broadcast deliveries, including events lost to lagging subscribers
//! - Active producer sessions and broadcast subscribers

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Frames received, by outcome
pub static FRAMES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("frames_total", "Frames received from producers by outcome")
            .namespace("detection_relay"),
        &["outcome"], // "processed", "dropped", "discarded", "decode_error", ...
    )
    .expect("Failed to create FRAMES_TOTAL metric")
});

/// Detector round-trip latency in seconds
pub static DETECTION_DURATION_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    let buckets = vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    Histogram::with_opts(
        HistogramOpts::new(
            "detection_duration_seconds",
            "Detector round-trip latency in seconds",
        )
        .namespace("detection_relay")
        .buckets(buckets),
    )
    .expect("Failed to create DETECTION_DURATION_SECONDS metric")
});

/// Alert lifecycle counter
pub static ALERTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("alerts_total", "Alerts by result").namespace("detection_relay"),
        &["result"], // "fired", "delivered", "failed", "queue_full"
    )
    .expect("Failed to create ALERTS_TOTAL metric")
});

/// Broadcast deliveries per subscriber
pub static BROADCAST_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("broadcast_events_total", "Broadcast deliveries by result")
            .namespace("detection_relay"),
        &["result"], // "delivered", "dropped", "pruned"
    )
    .expect("Failed to create BROADCAST_EVENTS_TOTAL metric")
});

/// Connected producer sessions
pub static SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("sessions_active", "Connected producer sessions").namespace("detection_relay"),
    )
    .expect("Failed to create SESSIONS_ACTIVE metric")
});

/// Broadcast audience size
pub static SUBSCRIBERS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("subscribers_active", "Broadcast subscribers").namespace("detection_relay"),
    )
    .expect("Failed to create SUBSCRIBERS_ACTIVE metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(FRAMES_TOTAL.clone()))
        .expect("Failed to register FRAMES_TOTAL");
    registry
        .register(Box::new(DETECTION_DURATION_SECONDS.clone()))
        .expect("Failed to register DETECTION_DURATION_SECONDS");
    registry
        .register(Box::new(ALERTS_TOTAL.clone()))
        .expect("Failed to register ALERTS_TOTAL");
    registry
        .register(Box::new(BROADCAST_EVENTS_TOTAL.clone()))
        .expect("Failed to register BROADCAST_EVENTS_TOTAL");
    registry
        .register(Box::new(SESSIONS_ACTIVE.clone()))
        .expect("Failed to register SESSIONS_ACTIVE");
    registry
        .register(Box::new(SUBSCRIBERS_ACTIVE.clone()))
        .expect("Failed to register SUBSCRIBERS_ACTIVE");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record a frame outcome
pub fn record_frame(outcome: &str) {
    FRAMES_TOTAL.with_label_values(&[outcome]).inc();
}

/// Helper to record detector latency
pub fn record_detection_latency(duration_secs: f64) {
    DETECTION_DURATION_SECONDS.observe(duration_secs);
}

/// Helper to record an alert lifecycle step
pub fn record_alert(result: &str) {
    ALERTS_TOTAL.with_label_values(&[result]).inc();
}

/// Helper to record `count` broadcast deliveries with one result
pub fn record_broadcast(result: &str, count: usize) {
    if count > 0 {
        BROADCAST_EVENTS_TOTAL
            .with_label_values(&[result])
            .inc_by(count as u64);
    }
}

/// Helper to update the session gauge
pub fn set_active_sessions(count: usize) {
    SESSIONS_ACTIVE.set(count as i64);
}

/// Helper to update the subscriber gauge
pub fn set_active_subscribers(count: usize) {
    SUBSCRIBERS_ACTIVE.set(count as i64);
}
