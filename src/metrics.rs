use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, register_counter_vec, register_histogram};

// Metric registration only fails on a duplicate name, which would be a bug here
lazy_static! {
    pub static ref REQUEST_TOTAL: CounterVec = register_counter_vec!(
        "gateway_requests_total",
        "Total number of requests to gated operations",
        &["operation"]
    )
    .unwrap();
    pub static ref ADMITTED_TOTAL: CounterVec = register_counter_vec!(
        "gateway_admitted_total",
        "Requests admitted by the rate limiter",
        &["operation"]
    )
    .unwrap();
    pub static ref DENIED_TOTAL: CounterVec = register_counter_vec!(
        "gateway_denied_total",
        "Requests denied by the rate limiter",
        &["operation", "window"]
    )
    .unwrap();
    pub static ref UPSTREAM_ERRORS: CounterVec = register_counter_vec!(
        "gateway_upstream_errors_total",
        "Failed calls to the generative-AI backend",
        &["operation"]
    )
    .unwrap();
    pub static ref UPSTREAM_LATENCY: Histogram = register_histogram!(
        "gateway_upstream_latency_seconds",
        "Latency of calls to the generative-AI backend in seconds"
    )
    .unwrap();
}
