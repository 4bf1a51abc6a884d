//! HTTP Basic-auth verification and the middleware that turns the verified
//! username into the request's [`Actor`].

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use gradebook_api::Actor;

use crate::error::Error;

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Verify Basic credentials from headers and return the authenticated
/// username.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<String, Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(username.to_string())
}

/// Reject unauthenticated requests; tag the rest with the caller's [`Actor`]
/// so grade writes record who made them.
pub async fn require_actor(
  State(auth): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Result<Response, Error> {
  let username = verify_auth(req.headers(), &auth)?;
  req.extensions_mut().insert(Actor(username));
  Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::{Request, header};

  fn config(password: &str) -> AuthConfig {
    use argon2::{PasswordHasher, password_hash::SaltString};
    use rand_core::OsRng;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AuthConfig { username: "registrar".to_string(), password_hash: hash }
  }

  fn headers(value: Option<&str>) -> HeaderMap {
    let mut builder = Request::builder();
    if let Some(value) = value {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(()).unwrap().into_parts().0.headers
  }

  fn basic(user: &str, pass: &str) -> String {
    let encoded = B64.encode(format!("{user}:{pass}"));
    format!("Basic {encoded}")
  }

  #[test]
  fn correct_credentials_yield_username() {
    let config = config("secret");
    let username = verify_auth(&headers(Some(&basic("registrar", "secret"))), &config);
    assert_eq!(username.unwrap(), "registrar");
  }

  #[test]
  fn wrong_password() {
    let config = config("secret");
    let result = verify_auth(&headers(Some(&basic("registrar", "wrong"))), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn wrong_username() {
    let config = config("secret");
    let result = verify_auth(&headers(Some(&basic("intruder", "secret"))), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }

  #[test]
  fn missing_header() {
    let config = config("secret");
    assert!(matches!(verify_auth(&headers(None), &config), Err(Error::Unauthorized)));
  }

  #[test]
  fn invalid_base64() {
    let config = config("secret");
    let result = verify_auth(&headers(Some("Basic !!!not-base64!!!")), &config);
    assert!(matches!(result, Err(Error::Unauthorized)));
  }
}
