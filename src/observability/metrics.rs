//! Metrics collection and exposition.
//!
//! # Metrics
//! - `circuit_breaker_transitions_total` (counter): state changes by breaker, from, to
//! - `circuit_breaker_throttled_total` (counter): requests rejected by `allow()`
//! - `circuit_breaker_outcomes_total` (counter): reported outcomes by breaker, outcome
//! - `circuit_breaker_state` (gauge): 0=open, 1=closed, 2=half-open
//!
//! Recording goes through the `metrics` facade and costs nothing until a
//! recorder is installed (see [`init_metrics`]).

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::breaker::State;

/// Outcome label for `circuit_breaker_outcomes_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn as_str(self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install Prometheus exporter"),
    }
}

/// Record a state change.
pub fn record_transition(breaker: &str, from: State, to: State) {
    counter!(
        "circuit_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    record_state(breaker, to);
}

/// Set the state gauge.
pub fn record_state(breaker: &str, state: State) {
    gauge!("circuit_breaker_state", "breaker" => breaker.to_string()).set(f64::from(state as u8));
}

/// Record a request rejected by the breaker.
pub fn record_throttled(breaker: &str) {
    counter!("circuit_breaker_throttled_total", "breaker" => breaker.to_string()).increment(1);
}

/// Record a reported outcome.
pub fn record_outcome(breaker: &str, outcome: Outcome) {
    counter!(
        "circuit_breaker_outcomes_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
