//! HTTP liveness endpoint for the hosting platform.
//!
//! Serves `GET /` with a fixed body so an external uptime probe can tell
//! the process is running. Runs alongside the bot's long-polling loop.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Response body for the liveness probe.
pub const ALIVE_BODY: &str = "Bot is alive!";

/// Start the liveness server on the given port.
pub async fn start_liveness_server(port: u16) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new().route("/", get(alive_handler));

    log::info!("Starting liveness server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET / — liveness probe.
async fn alive_handler() -> impl IntoResponse {
    (StatusCode::OK, ALIVE_BODY)
}
