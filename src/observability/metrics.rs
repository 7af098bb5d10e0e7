//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by operation, status
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency by operation
//! - `gateway_backend_errors_total` (counter): failed backend calls by kind
//!
//! # Design Decisions
//! - Operation label only for identifiers present in the resolution table,
//!   so client input cannot grow label cardinality
//! - Recording is a no-op until a recorder is installed

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a completed client request.
pub fn record_request(operation: &str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_requests_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_request_duration_seconds", "operation" => operation.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed backend call.
pub fn record_backend_error(kind: &'static str) {
    metrics::counter!("gateway_backend_errors_total", "kind" => kind).increment(1);
}
