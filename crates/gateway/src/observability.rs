use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter, Encoder, Histogram, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gatekeep_gateway_requests_total",
        "Total requests received by the gateway"
    )
    .expect("register requests_total")
});

pub static TENANT_MISSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gatekeep_gateway_tenant_misses_total",
        "Requests whose host did not resolve to a tenant"
    )
    .expect("register tenant_misses_total")
});

pub static REGISTRY_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gatekeep_gateway_registry_errors_total",
        "Tenant registry lookups that failed"
    )
    .expect("register registry_errors_total")
});

pub static UPSTREAM_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "gatekeep_gateway_upstream_errors_total",
        "Forwarded requests that got no upstream response"
    )
    .expect("register upstream_errors_total")
});

pub static UPSTREAM_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "gatekeep_gateway_upstream_duration_seconds",
        "Upstream round trip in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("register upstream_duration")
});

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
