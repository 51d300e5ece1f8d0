//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status, route
//! - `gateway_request_duration_seconds` (histogram): latency by method, route
//! - `gateway_cache_lookups_total` (counter): lookups by route, outcome (hit/miss)
//! - `gateway_cache_stores_total` (counter): store decisions by route, outcome
//!   (stored/skipped/failed)
//! - `gateway_upstream_errors_total` (counter): transport failures by route

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!("gateway_requests_total", "Total number of requests handled");
    describe_histogram!("gateway_request_duration_seconds", "Request latency in seconds");
    describe_counter!("gateway_cache_lookups_total", "Cache lookups by outcome");
    describe_counter!("gateway_cache_stores_total", "Cache store decisions by outcome");
    describe_counter!("gateway_upstream_errors_total", "Upstream transport failures");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, route: &str, start_time: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "route" => route.to_string()
    )
    .increment(1);
    histogram!(
        "gateway_request_duration_seconds",
        "method" => method.to_string(),
        "route" => route.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(route: &str, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("gateway_cache_lookups_total", "route" => route.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_cache_store(route: &str, outcome: &'static str) {
    counter!("gateway_cache_stores_total", "route" => route.to_string(), "outcome" => outcome)
        .increment(1);
}

pub fn record_upstream_error(route: &str) {
    counter!("gateway_upstream_errors_total", "route" => route.to_string()).increment(1);
}
