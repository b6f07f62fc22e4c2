//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): requests by surface and outcome
//! - `router_request_duration_seconds` (histogram): resolution + dispatch latency
//! - `router_redirects_total` (counter): substitutions by reason
//! - `router_table_routes` (gauge): routes in the active table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so library code and tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a finished request.
pub fn record_request(surface: &'static str, outcome: &'static str, start: Instant) {
    metrics::counter!("router_requests_total", "surface" => surface, "outcome" => outcome).increment(1);
    metrics::histogram!("router_request_duration_seconds", "surface" => surface)
        .record(start.elapsed().as_secs_f64());
}

/// Record a target substitution.
pub fn record_redirect(reason: &'static str) {
    metrics::counter!("router_redirects_total", "reason" => reason).increment(1);
}

/// Record the size of the active route table.
pub fn record_route_count(count: usize) {
    metrics::gauge!("router_table_routes").set(count as f64);
}
