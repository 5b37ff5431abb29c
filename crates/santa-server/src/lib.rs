//! Server wiring for the Secret Santa allocator: configuration, the HTTP
//! router, and the registry seed format.

pub mod seed;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Router, routing::get};
use santa_core::{service::SecretSanta, store::SantaStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Loaded from an optional TOML file and overridden by `SANTA_`-prefixed
/// environment variables (`SANTA_PORT`, `SANTA_STORE_PATH`, ...).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
}

impl ServerConfig {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "127.0.0.1")?
      .set_default("port", 8080_i64)?
      .set_default("store_path", "santa.db")?
      .add_source(config::File::from(path.as_ref()).required(false))
      .add_source(config::Environment::with_prefix("SANTA"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: `/api/santa`, `/healthz`, and request tracing.
pub fn router<S>(santa: Arc<SecretSanta<S>>) -> Router
where
  S: SantaStore + 'static,
{
  Router::new()
    .nest("/api", santa_api::api_router(santa))
    .route("/healthz", get(|| async { "ok" }))
    .layer(TraceLayer::new_for_http())
}
