use std::{net::SocketAddr, sync::Arc};

use configs::AppConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Resolves once Ctrl+C arrives; in-flight requests are then drained by axum.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!(event = "shutdown_signal", "received Ctrl+C, shutting down");
}

/// Public entry: open the store, build the app, serve until Ctrl+C, then
/// close the store.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let store = service::store::connect(&cfg.store).await?;
    let state = AppState::new(Arc::clone(&store), &cfg.server.service_name);
    let app = routes::build_router(state, build_cors(), &cfg.server.api_prefix);

    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, store = store.kind(), api_prefix = %cfg.server.api_prefix, "resource api listening");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!(store = store.kind(), "http server stopped, closing store");
    store.close().await?;
    Ok(())
}
