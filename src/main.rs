//! Document Quiz · Backend
//!
//! - Axum HTTP API (documents, question answering, quiz generation)
//! - OpenAI-compatible text generation (via environment variables)
//!
//! Important env variables (a `.env` file is honored):
//!   PORT                : u16 (default 5000)
//!   OPENAI_API_KEY      : enables the generation service if present
//!   OPENAI_BASE_URL     : default "https://openrouter.ai/api/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   OPENAI_TIMEOUT_SECS : default 60
//!   APP_CONFIG_PATH     : path to TOML config (prompts + generation/server limits)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::{info, warn};

use docquiz_backend::routes::build_router;
use docquiz_backend::state::AppState;
use docquiz_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  let dotenv = dotenvy::dotenv();
  telemetry::init_tracing()?;
  match dotenv {
    Ok(path) => info!(target: "docquiz_backend", path = %path.display(), "Loaded .env"),
    Err(e) if e.not_found() => {}
    Err(e) => warn!(target: "docquiz_backend", error = %e, "Ignoring unreadable .env"),
  }

  // Shared application state (document store, generation client, prompts).
  let state = Arc::new(AppState::new());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 5000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "docquiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "docquiz_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "docquiz_backend", error = %e, "Ctrl-C handler unavailable; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "docquiz_backend", "Shutdown signal received");
}
