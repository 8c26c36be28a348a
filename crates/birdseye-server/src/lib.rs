//! HTTP endpoints next to the board: an image proxy that turns storage
//! objects into plain responses, and the link-preview stub.

pub mod routes;
pub mod state;

use anyhow::Context;
use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/images/{*id}",
            get(routes::images::get_image).fallback(routes::unsupported),
        )
        .route("/api/urls/fetch", any(routes::urls::fetch_url_meta))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the endpoints on `bind` until Ctrl+C.
pub async fn run_server(state: AppState, bind: &str) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Serving on http://{}", local_addr);
    eprintln!("Bird's Eye View endpoints at http://{}", local_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
