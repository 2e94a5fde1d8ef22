//! HTTP Basic-auth session extractor and password helpers.
//!
//! Every admin handler takes an [`AdminSession`]; there is no ambient
//! "logged in" state. Credentials are read from the store on each request,
//! so a password change takes effect immediately.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use idverify_core::{credentials::AdminCredentials, verify::Advisor};
use rand_core::OsRng;

use crate::{AppState, Backend, error::ApiError};

/// Proof that the request carried valid admin credentials.
#[derive(Debug, Clone)]
pub struct AdminSession {
  pub username: String,
}

/// Argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// `true` when `password` matches the stored hash.
pub fn verify_password(credentials: &AdminCredentials, password: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(&credentials.password_hash) else {
    tracing::warn!("stored admin password hash is not a valid PHC string");
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// Check a `Basic` authorization header against `credentials`.
pub fn verify_basic(
  headers: &HeaderMap,
  credentials: &AdminCredentials,
) -> Result<AdminSession, ApiError> {
  let encoded = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let pair = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;
  let (username, password) = pair.split_once(':').ok_or(ApiError::Unauthorized)?;

  if username != credentials.username || !verify_password(credentials, password) {
    return Err(ApiError::Unauthorized);
  }
  Ok(AdminSession { username: username.to_owned() })
}

impl<S, A> FromRequestParts<AppState<S, A>> for AdminSession
where
  S: Backend,
  A: Advisor + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, A>,
  ) -> Result<Self, Self::Rejection> {
    let credentials = match state.store.load_credentials().await {
      Ok(Some(credentials)) => credentials,
      Ok(None) => {
        tracing::warn!("no admin credentials stored; rejecting admin request");
        return Err(ApiError::Unauthorized);
      }
      Err(e) => return Err(ApiError::store(e)),
    };
    verify_basic(&parts.headers, &credentials)
  }
}
