//! Quiz Backend · question bank + free-text answer scoring
//!
//! - Axum HTTP API consumed by the quiz and admin UIs
//! - Bearer-token admin session for mutating endpoints
//! - Optional JSON snapshot loaded at startup and saved on shutdown
//!
//! Important env variables:
//!   PORT             : u16 (default 5000)
//!   BIND_ADDR        : listen address (default 0.0.0.0)
//!   ADMIN_PASSWORD   : admin secret (required unless set in the TOML file)
//!   TOKEN_TTL_SECS   : admin token lifetime, 0 = never expire (default 28800)
//!   SCORE_SCALE      : "linear" (default) or "banded"
//!   EXPOSE_ANSWERS   : "true" to include correct_answer in anonymous listings
//!   QUIZ_DATA_PATH   : JSON snapshot file
//!   QUIZ_CONFIG_PATH : path to TOML config (settings + optional seed questions)
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use quiz_backend::config::ServiceConfig;
use quiz_backend::routes::build_router;
use quiz_backend::state::AppState;
use quiz_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = ServiceConfig::from_env().map_err(|e| {
    error!(target: "quiz_backend", error = %e, "Invalid configuration");
    e
  })?;
  info!(target: "quiz_backend", config = ?cfg, "Configuration resolved");

  // Build shared application state (store seeded from TOML + snapshot, scorer, auth gate).
  let state = Arc::new(AppState::bootstrap(&cfg).await?);

  let app = build_router(state.clone());

  let listener = TcpListener::bind(cfg.addr).await?;
  info!(target: "quiz_backend", addr = %cfg.addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

  info!(target: "quiz_backend", "Shutting down; saving questions");
  if let Err(e) = state.persist().await {
    error!(target: "quiz_backend", error = %e, "Failed to save question snapshot");
  }
  Ok(())
}

async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      error!(target: "quiz_backend", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => {
        sig.recv().await;
      }
      Err(e) => {
        error!(target: "quiz_backend", error = %e, "Failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
}
