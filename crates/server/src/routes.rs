use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::{observability, types::Health};

use crate::state::ServerState;

pub mod kv;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> (StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router: key-value routes plus health and metrics.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let kv_routes = Router::new()
        .route("/kv/set", post(kv::set_value))
        .route("/kv/get/:key", get(kv::get_value))
        .route("/kv/get-keys", get(kv::get_keys))
        .route("/kv/is-valid/:password", get(kv::is_valid));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    kv_routes
        .merge(ops)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path; headers are
                // left out because Authorization carries the admin credential
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // status code and latency
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
