//! Prometheus metrics
//!
//! Recorded through the `metrics` facade; rendered at `/metrics` by the
//! Prometheus exporter when it is installed.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use chat_agent_agent::TurnReport;

use crate::state::AppState;
use crate::ServerError;

pub const INBOUND_TOTAL: &str = "chat_agent_inbound_total";
pub const EFFECT_FAILURES_TOTAL: &str = "chat_agent_effect_failures_total";
pub const TURN_LATENCY_SECONDS: &str = "chat_agent_turn_latency_seconds";

/// Install the global Prometheus recorder
pub fn init_metrics() -> Result<PrometheusHandle, ServerError> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Internal(format!("metrics recorder: {}", e)))?;

    metrics::describe_counter!(INBOUND_TOTAL, "Inbound messages by outcome");
    metrics::describe_counter!(EFFECT_FAILURES_TOTAL, "Outbound effects that failed or timed out");
    metrics::describe_histogram!(TURN_LATENCY_SECONDS, "Time to decide and deliver one turn");

    Ok(handle)
}

/// Count an inbound message that never reached the agent
pub fn record_ignored(reason: &'static str) {
    metrics::counter!(INBOUND_TOTAL, "outcome" => reason).increment(1);
}

/// Record a finished turn
pub fn record_turn(report: &TurnReport) {
    metrics::counter!(INBOUND_TOTAL, "outcome" => report.outcome.as_str()).increment(1);
    if !report.execution.failed.is_empty() {
        metrics::counter!(EFFECT_FAILURES_TOTAL).increment(report.execution.failed.len() as u64);
    }
    metrics::histogram!(TURN_LATENCY_SECONDS).record(report.elapsed_ms as f64 / 1000.0);
}

/// Prometheus text exposition
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}
