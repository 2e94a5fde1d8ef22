//! JSON REST API for IDVerify.
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`] +
//! [`SettingsStore`] and any [`Advisor`]. Admin routes require an
//! [`auth::AdminSession`]; verification and photos are public.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", idverify_api::api_router(state.clone()))
//! ```

pub mod auth;
pub mod error;
pub mod import;
pub mod photo;
pub mod qr;
pub mod records;
pub mod settings;
pub mod verify;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use idverify_core::{
  store::{RecordStore, SettingsStore},
  verify::{Advisor, Resolver},
};
use idverify_qr::{DEFAULT_DOWNLOAD_SIZE, DEFAULT_JPEG_QUALITY};

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Settings the handlers need beyond the store.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  /// Deployment base that verification links are built from,
  /// e.g. `https://cards.example.org/`.
  pub base_url:         String,
  /// Edge length of the downloadable QR JPEG.
  pub qr_download_size: u32,
  pub jpeg_quality:     u8,
}

impl ApiConfig {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url:         base_url.into(),
      qr_download_size: DEFAULT_DOWNLOAD_SIZE,
      jpeg_quality:     DEFAULT_JPEG_QUALITY,
    }
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Storage the API can run on: records plus the admin settings document.
pub trait Backend: RecordStore + SettingsStore + Send + Sync + 'static {}

impl<T> Backend for T where T: RecordStore + SettingsStore + Send + Sync + 'static {}

/// Shared state threaded through all axum handlers.
pub struct AppState<S, A> {
  pub store:    Arc<S>,
  pub resolver: Arc<Resolver<S, A>>,
  pub config:   Arc<ApiConfig>,
}

// Manual impl: `S` and `A` themselves need not be `Clone`.
impl<S, A> Clone for AppState<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      resolver: self.resolver.clone(),
      config:   self.config.clone(),
    }
  }
}

impl<S, A> AppState<S, A>
where
  S: Backend,
  A: Advisor + 'static,
{
  pub fn new(
    store: Arc<S>,
    advisor: Option<Arc<A>>,
    advisory_timeout: Duration,
    config: ApiConfig,
  ) -> Self {
    let resolver = Resolver::new(store.clone(), advisor, advisory_timeout);
    Self {
      store,
      resolver: Arc::new(resolver),
      config: Arc::new(config),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, A>(state: AppState<S, A>) -> Router<()>
where
  S: Backend,
  A: Advisor + 'static,
{
  Router::new()
    // Records
    .route("/records", get(records::list::<S, A>).post(records::create::<S, A>))
    .route("/records/bulk-delete", post(records::bulk_delete::<S, A>))
    .route(
      "/records/{id}",
      get(records::get_one::<S, A>)
        .patch(records::update::<S, A>)
        .delete(records::delete_one::<S, A>),
    )
    .route("/records/{id}/summary", get(records::summary::<S, A>))
    .route("/records/{id}/photo", get(photo::handler::<S, A>))
    // QR
    .route("/records/{id}/qr.svg", get(qr::svg::<S, A>))
    .route("/records/{id}/qr.jpg", get(qr::jpeg::<S, A>))
    // Import
    .route("/import", post(import::handler::<S, A>))
    // Verification
    .route("/verify/{id}", get(verify::handler::<S, A>))
    // Settings
    .route(
      "/settings/admin",
      get(settings::get_admin::<S, A>).put(settings::update_admin::<S, A>),
    )
    .with_state(state)
}
