//! Health-check service for the Folio admin shell.
//!
//! The admin UI runs entirely client-side; the only server route is `/`,
//! which answers any request with a fixed acknowledgment.

use axum::{Router, routing::any};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Body returned by the health route.
pub const HEALTH_BODY: &str = "ok";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `FOLIO_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host: default_host(),
      port: default_port(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

async fn health() -> &'static str { HEALTH_BODY }

/// Build the axum [`Router`]. Unknown paths fall through to axum's 404.
pub fn router() -> Router {
  Router::new()
    .route("/", any(health))
    .layer(TraceLayer::new_for_http())
}
