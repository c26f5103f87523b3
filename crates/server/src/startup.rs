use std::future::Future;

use axum::Router;
use configs::AppConfig;
use service::{access::AccessController, file::kv_file_store::FileKvStore, runtime};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Browser clients call from any origin, with credentials.
fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Open the store named by `cfg` and wire it to the access controller.
///
/// Fails when the data file exists but cannot be read or parsed.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    cfg.validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    runtime::ensure_env(&cfg.data_file).await?;

    let store = FileKvStore::open(&cfg.data_file).await?;
    let entries = store.entry_count().await;
    common::observability::KV_ENTRIES.set(entries as i64);
    info!(data_file = %cfg.data_file.display(), entries, "store loaded");

    Ok(ServerState::new(store, AccessController::new(cfg.admin_password.clone())))
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve `state` on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: ServerState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: load the store, bind, and run the HTTP server until Ctrl+C
pub async fn run(cfg: AppConfig) -> Result<(), StartupError> {
    let state = build_state(&cfg).await?;

    let addr = cfg.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.clone(), source })?;
    info!(%addr, "starting key-value server");
    serve(listener, state, shutdown_signal()).await?;
    Ok(())
}
