//! The identity recorded as `modified_by` on grade writes.

use std::{convert::Infallible, fmt};

use axum::{extract::FromRequestParts, http::request::Parts};
use gradebook_core::history::SYSTEM_ACTOR;

/// Who is making the request.
///
/// An authentication layer inserts an `Actor` into the request extensions.
/// Requests that arrive without one act as [`SYSTEM_ACTOR`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
  pub fn system() -> Self { Actor(SYSTEM_ACTOR.to_string()) }

  pub fn name(&self) -> &str { &self.0 }
}

impl fmt::Display for Actor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl<St: Send + Sync> FromRequestParts<St> for Actor {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
    Ok(parts.extensions.get::<Actor>().cloned().unwrap_or_else(Actor::system))
  }
}
