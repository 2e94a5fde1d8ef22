//! Process-level wiring for the IDVerify server: configuration, the
//! top-level router, and first-start credential seeding.
//!
//! The binary in `main.rs` picks a store and an advisor from
//! [`ServerConfig`] and hands them to [`app`].

pub mod error;
pub mod page;

pub use error::{Error, Result};

use std::{path::PathBuf, time::Duration};

use axum::{Router, routing::get};
use idverify_advisor::GeminiConfig;
use idverify_api::{ApiConfig, AppState, Backend, api_router, auth::hash_password};
use idverify_core::{
  credentials::AdminCredentials,
  store::SettingsStore,
  verify::Advisor,
};
use idverify_store_remote::RemoteConfig;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

/// Password seeded when the store has no credentials and none are configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `IDVERIFY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  /// Public base that QR links point at.
  #[serde(default = "default_base_url")]
  pub base_url:              String,
  #[serde(default)]
  pub store:                 StoreConfig,
  /// Absent means verification uses the date check only.
  #[serde(default)]
  pub advisor:               Option<AdvisorConfig>,
  #[serde(default = "default_admin_username")]
  pub admin_username:        String,
  /// Argon2 PHC string, used only when the store holds no credentials yet.
  #[serde(default)]
  pub admin_password_hash:   Option<String>,
  #[serde(default = "default_advisory_timeout_secs")]
  pub advisory_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_base_url() -> String { "http://localhost:8080/".to_owned() }
fn default_admin_username() -> String { "admin".to_owned() }
fn default_advisory_timeout_secs() -> u64 { 5 }

impl ServerConfig {
  pub fn api_config(&self) -> ApiConfig { ApiConfig::new(self.base_url.clone()) }

  pub fn advisory_timeout(&self) -> Duration {
    Duration::from_secs(self.advisory_timeout_secs)
  }
}

/// Which Record Store variant to run on. Chosen once at startup.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreConfig {
  Sqlite {
    path: PathBuf,
  },
  Remote {
    endpoint:     String,
    #[serde(default)]
    api_key:      Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
  },
}

impl Default for StoreConfig {
  fn default() -> Self { Self::Sqlite { path: PathBuf::from("idverify.db") } }
}

impl StoreConfig {
  /// Settings for the remote variant; `None` for SQLite.
  pub fn remote(&self) -> Option<RemoteConfig> {
    let Self::Remote { endpoint, api_key, timeout_secs } = self else {
      return None;
    };
    let mut config = RemoteConfig::new(endpoint.clone());
    config.api_key = api_key.clone();
    if let Some(secs) = timeout_secs {
      config.timeout = Duration::from_secs(*secs);
    }
    Some(config)
  }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AdvisorConfig {
  pub api_key:  String,
  #[serde(default)]
  pub model:    Option<String>,
  #[serde(default)]
  pub endpoint: Option<String>,
}

impl AdvisorConfig {
  /// Client settings. The HTTP timeout matches the resolver's wait so a
  /// request that has been given up on does not linger.
  pub fn gemini(&self, timeout: Duration) -> GeminiConfig {
    let mut config = GeminiConfig::new(self.api_key.clone());
    if let Some(model) = &self.model {
      config.model = model.clone();
    }
    if let Some(endpoint) = &self.endpoint {
      config.endpoint = endpoint.clone();
    }
    config.timeout = timeout;
    config
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The complete application: JSON API under `/api`, the public verification
/// page, and the landing page that forwards fragment-style links.
pub fn app<S, A>(state: AppState<S, A>) -> Router
where
  S: Backend,
  A: Advisor + 'static,
{
  Router::new()
    .route("/", get(page::landing))
    .route("/verify/{id}", get(page::verify::<S, A>))
    .with_state(state.clone())
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// Write the configured admin credentials if the store has none.
///
/// Returns whether anything was written. Existing credentials always win, so
/// a password changed through the API survives restarts.
pub async fn seed_credentials<S>(store: &S, config: &ServerConfig) -> Result<bool>
where
  S: SettingsStore,
{
  let existing = store
    .load_credentials()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  if existing.is_some() {
    return Ok(false);
  }

  let password_hash = match &config.admin_password_hash {
    Some(hash) => hash.clone(),
    None => {
      tracing::warn!(
        username = %config.admin_username,
        "no admin_password_hash configured; seeding the default password"
      );
      hash_password(DEFAULT_ADMIN_PASSWORD)?
    }
  };
  let credentials = AdminCredentials::new(config.admin_username.clone(), password_hash)?;
  store
    .save_credentials(credentials)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  tracing::info!(username = %config.admin_username, "admin credentials seeded");
  Ok(true)
}
