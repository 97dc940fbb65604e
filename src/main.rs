//! AdaptIQ · Adaptive Quiz Backend
//!
//! - Axum HTTP API: upload a question bank, take tier-based batches, get
//!   graded, climb the difficulty ladder, download a performance report
//! - Optional OpenAI-compatible assistant (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   OPENAI_API_KEY    : enables the chat assistant if present
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_CHAT_MODEL : default "gpt-4o-mini"
//!   QUIZ_CONFIG_PATH  : path to TOML config (prompts + report output dir)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use adaptiq_backend::routes::build_router;
use adaptiq_backend::session::AppState;
use adaptiq_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (session store, prompts, assistant).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "adaptiq_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
