//! Handlers for `/settings/admin`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/settings/admin` | `{"username": ...}` |
//! | `PUT`  | `/settings/admin` | Body: `{"current_password", "username"?, "new_password"?}` |

use axum::{Json, extract::State};
use idverify_core::{
  credentials::AdminCredentials,
  store::SettingsStore,
  verify::Advisor,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState, Backend,
  auth::{AdminSession, hash_password, verify_password},
  error::ApiError,
};

#[derive(Debug, Serialize)]
pub struct AdminView {
  pub username: String,
}

/// `GET /settings/admin`
pub async fn get_admin<S, A>(
  session: AdminSession,
  State(_state): State<AppState<S, A>>,
) -> Json<AdminView>
where
  S: Backend,
  A: Advisor + 'static,
{
  Json(AdminView { username: session.username })
}

#[derive(Debug, Deserialize)]
pub struct UpdateAdminBody {
  /// Re-entered even though the request is authenticated.
  pub current_password: String,
  pub username:         Option<String>,
  pub new_password:     Option<String>,
}

/// `PUT /settings/admin`
pub async fn update_admin<S, A>(
  session: AdminSession,
  State(state): State<AppState<S, A>>,
  Json(body): Json<UpdateAdminBody>,
) -> Result<Json<AdminView>, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let current = state
    .store
    .load_credentials()
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;
  if !verify_password(&current, &body.current_password) {
    return Err(ApiError::BadRequest("current password is incorrect".to_owned()));
  }

  let password_hash = match body.new_password.as_deref() {
    Some(p) if p.trim().is_empty() => {
      return Err(ApiError::BadRequest("new password must not be blank".to_owned()));
    }
    Some(p) => hash_password(p)?,
    None => current.password_hash,
  };
  let username = body.username.unwrap_or(session.username);
  let credentials =
    AdminCredentials::new(username, password_hash).map_err(ApiError::invalid)?;

  state
    .store
    .save_credentials(credentials.clone())
    .await
    .map_err(ApiError::store)?;
  tracing::info!(username = %credentials.username, "admin credentials updated");
  Ok(Json(AdminView { username: credentials.username }))
}
