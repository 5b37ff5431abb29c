//! JSON API for the Secret Santa allocator.
//!
//! Exposes an axum [`Router`] backed by a [`SecretSanta`] service over any
//! [`SantaStore`]. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", santa_api::api_router(santa.clone()))
//! ```

pub mod error;
pub mod santa;

use std::sync::Arc;

use axum::{Router, routing::post};
use santa_core::{service::SecretSanta, store::SantaStore};

pub use error::ApiError;

/// Build the API router for `santa`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(santa: Arc<SecretSanta<S>>) -> Router<()>
where
  S: SantaStore + 'static,
{
  Router::new()
    .route("/santa", post(santa::handler::<S>))
    .with_state(santa)
}

// ─── Integration tests ────────────────────────────────────────────────────────
