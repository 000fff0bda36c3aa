//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Live session gauge
//! - Open WebSocket connection gauge
//! - Resolved rounds by trigger
//! - Accepted answers by correctness

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "quiz_server";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Live sessions held by the registry
pub static SESSIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("sessions_active", "Number of live quiz sessions").namespace(NAMESPACE),
    )
    .expect("Failed to create SESSIONS_ACTIVE metric")
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace(NAMESPACE),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Rounds resolved, by what ended them
pub static ROUNDS_RESOLVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("rounds_resolved_total", "Total number of resolved rounds").namespace(NAMESPACE),
        &["trigger"], // "deadline", "all_answered", "moderator"
    )
    .expect("Failed to create ROUNDS_RESOLVED_TOTAL metric")
});

/// Accepted answers, by correctness
pub static ANSWERS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("answers_total", "Total number of accepted answers").namespace(NAMESPACE),
        &["correct"],
    )
    .expect("Failed to create ANSWERS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(SESSIONS_ACTIVE.clone()))
        .expect("Failed to register SESSIONS_ACTIVE");
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(ROUNDS_RESOLVED_TOTAL.clone()))
        .expect("Failed to register ROUNDS_RESOLVED_TOTAL");
    registry
        .register(Box::new(ANSWERS_TOTAL.clone()))
        .expect("Failed to register ANSWERS_TOTAL");
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

/// Helper to update the live session count
pub fn set_sessions_active(count: usize) {
    SESSIONS_ACTIVE.set(count as i64);
}

/// Helper to update WebSocket connection count
pub fn set_websocket_connections(connected: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(connected as i64);
}

/// Helper to record a resolved round
pub fn record_round_resolved(trigger: &str) {
    ROUNDS_RESOLVED_TOTAL.with_label_values(&[trigger]).inc();
}

/// Helper to record an accepted answer
pub fn record_answer(correct: bool) {
    let label = if correct { "true" } else { "false" };
    ANSWERS_TOTAL.with_label_values(&[label]).inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*SESSIONS_ACTIVE;
        let _ = &*WEBSOCKET_CONNECTIONS_ACTIVE;
        let _ = &*ROUNDS_RESOLVED_TOTAL;
        let _ = &*ANSWERS_TOTAL;
    }

    #[test]
    fn test_record_round_resolved() {
        record_round_resolved("deadline");
        let metrics = gather_metrics();
        assert!(metrics.contains("quiz_server_rounds_resolved_total"));
        assert!(metrics.contains("trigger=\"deadline\""));
    }

    #[test]
    fn test_record_answer() {
        let before = ANSWERS_TOTAL.with_label_values(&["true"]).get();
        record_answer(true);
        assert!(ANSWERS_TOTAL.with_label_values(&["true"]).get() > before);
        assert!(gather_metrics().contains("quiz_server_answers_total"));
    }
}
