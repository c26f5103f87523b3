use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Encoder, Histogram, IntCounter,
    IntGauge, TextEncoder,
};

// Prometheus metrics (default registry)
pub static KV_SETS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("kv_sets_total", "Total successful set operations")
        .expect("register kv_sets_total")
});

pub static KV_GETS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("kv_gets_total", "Total get operations")
        .expect("register kv_gets_total")
});

pub static KV_GET_MISSES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!("kv_get_misses_total", "Total get operations on absent keys")
        .expect("register kv_get_misses_total")
});

pub static KV_UNAUTHORIZED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kv_unauthorized_total",
        "Total mutations rejected for a wrong credential"
    )
    .expect("register kv_unauthorized_total")
});

pub static KV_PERSIST_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "kv_persist_failures_total",
        "Total snapshot writes that failed after the map was mutated"
    )
    .expect("register kv_persist_failures_total")
});

pub static KV_PERSIST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "kv_persist_duration_seconds",
        "Snapshot write duration in seconds",
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("register kv_persist_duration")
});

pub static KV_ENTRIES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("kv_entries", "Number of entries currently held in memory")
        .expect("register kv_entries")
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
