//! Metrics collection and exposition.
//!
//! # Metrics
//! - `crs_calls_total` (counter): facade calls by operation, outcome
//! - `crs_call_duration_seconds` (histogram): facade call latency by operation
//! - `crs_retries_total` (counter): retry attempts by operation
//! - `crs_logins_total` (counter): login attempts by outcome
//! - `crs_circuit_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed (see `init_metrics`).

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_call(operation: &str, outcome: &str, start: Instant) {
    metrics::counter!(
        "crs_calls_total",
        "operation" => operation.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    metrics::histogram!("crs_call_duration_seconds", "operation" => operation.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(operation: &str) {
    metrics::counter!("crs_retries_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_login(outcome: &str) {
    metrics::counter!("crs_logins_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn record_circuit_state(breaker: &str, state: CircuitState) {
    let value = match state {
        CircuitState::Closed => 0.0,
        CircuitState::HalfOpen => 1.0,
        CircuitState::Open => 2.0,
    };
    metrics::gauge!("crs_circuit_state", "breaker" => breaker.to_string()).set(value);
}
