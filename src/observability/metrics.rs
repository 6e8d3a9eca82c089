//! Metrics collection and exposition.
//!
//! # Metrics
//! - `natours_requests_total` (counter): requests by method, status, route group
//! - `natours_request_duration_seconds` (histogram): latency by the same labels
//! - `natours_rate_limited_total` (counter): requests rejected by the limiter
//! - `natours_errors_total` (counter): errors rendered, by kind
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Route group label comes from the dispatch table, never from the raw path

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RouteTable;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(err) => tracing::error!(address = %addr, error = %err, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, group: &'static str, start: Instant) {
    let labels = [
        ("method", method.to_owned()),
        ("status", status.to_string()),
        ("group", group.to_owned()),
    ];
    metrics::counter!("natours_requests_total", &labels).increment(1);
    metrics::histogram!("natours_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    metrics::counter!("natours_rate_limited_total").increment(1);
}

pub fn record_error(kind: &'static str) {
    metrics::counter!("natours_errors_total", "kind" => kind).increment(1);
}

/// Middleware recording count and latency of every request.
pub async fn track_metrics(
    State(table): State<Arc<RouteTable>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let group = table
        .resolve(request.uri().path())
        .map(|group| group.label())
        .unwrap_or("none");

    let response = next.run(request).await;
    record_request(&method, response.status().as_u16(), group, start);
    response
}
