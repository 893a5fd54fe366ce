//! The HTTP/SSE operator control surface: an `axum` `Router` over the
//! handlers in [`handlers`], plus `/health`, `/livez`, `/readyz`,
//! `/downloads` and `/metrics` alongside the Run-control routes.

pub mod handlers;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use wayfarer_kernel::{Config, RunController};

pub use state::ServeState;

/// Assemble the full router over `state`.
pub fn router(state: ServeState) -> Router {
    let downloads = ServeDir::new(state.config.artifact_root.clone());

    Router::new()
        .route("/start", post(handlers::start_handler))
        .route("/stop", post(handlers::stop_handler))
        .route("/models", get(handlers::models_handler))
        .route("/tts/done", post(handlers::tts_done_handler))
        .route("/tts/toggle", post(handlers::tts_toggle_handler))
        .route("/events", get(handlers::events_sse_handler))
        .route("/health", get(handlers::health_handler))
        .route("/livez", get(handlers::live_handler))
        .route("/readyz", get(handlers::ready_handler))
        .route("/metrics", get(metrics_handler))
        .nest_service("/downloads", downloads)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn metrics_handler() -> impl IntoResponse {
    crate::metrics::register_metrics();
    let (content_type, body) = crate::metrics::encode();
    ([(axum::http::header::CONTENT_TYPE, content_type)], body)
}

/// Build a fresh `RunController` behind the HTTP surface, bind `addr`
/// (falling back to `config.http_addr`), and serve until the process is
/// killed or the listener errors out.
pub async fn serve(config: Config, addr: Option<String>) -> Result<()> {
    let bind_addr = addr.unwrap_or_else(|| config.http_addr.clone());
    let socket_addr: SocketAddr = bind_addr
        .parse()
        .with_context(|| format!("invalid HTTP bind address: {bind_addr}"))?;

    let bus = wayfarer_event_bus::AgentEventBus::new(256);
    let controller = Arc::new(RunController::new(config.clone(), bus));
    let state = ServeState::new(config, controller);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(socket_addr)
        .await
        .with_context(|| format!("failed to bind {socket_addr}"))?;
    info!(%socket_addr, "serving HTTP control surface");
    axum::serve(listener, app).await.context("HTTP server exited with an error")
}
