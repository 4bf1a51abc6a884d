//! HTTP host for the gradebook engine.
//!
//! Mounts [`gradebook_api::api_router`] under `/api` behind HTTP Basic auth
//! and request tracing.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware::from_fn_with_state};
use gradebook_core::store::GradebookStore;
use gradebook_engine::{EngineConfig, GradebookEngine};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_actor};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GRADEBOOK_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
  #[serde(default)]
  pub engine:             EngineConfig,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs.
#[derive(Clone)]
pub struct AppState<S> {
  pub engine: GradebookEngine<S>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: GradebookStore + 'static,
{
  let api = gradebook_api::api_router(state.engine)
    .layer(from_fn_with_state(state.auth, require_actor));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
