//! Metrics collection and exposition.
//!
//! # Metrics
//! - `locale_router_decisions_total` (counter): routing decisions by state, outcome
//! - `locale_router_requests_total` (counter): responses by method, status
//! - `locale_router_request_duration_seconds` (histogram): latency by method
//! - `locale_router_config_reloads_total` (counter): hot reloads by result
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Labels are closed sets; never the raw path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::routing::planner::RoutingOutcome;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_decision(outcome: &RoutingOutcome) {
    metrics::counter!(
        "locale_router_decisions_total",
        "state" => outcome.state.as_str(),
        "outcome" => outcome.decision.outcome_label(),
    )
    .increment(1);
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "locale_router_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
    )
    .increment(1);
    metrics::histogram!("locale_router_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_config_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("locale_router_config_reloads_total", "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::planner::{RedirectDecision, RoutingState};

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let outcome = RoutingOutcome {
            state: RoutingState::PassThrough,
            decision: RedirectDecision::PassThrough,
            source: None,
            location: None,
        };
        record_decision(&outcome);
        record_request("GET", 200, Instant::now());
        record_config_reload(true);
    }
}
