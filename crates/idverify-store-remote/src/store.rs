//! [`RemoteStore`]: the document-store implementation of [`RecordStore`].

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use idverify_core::{
  credentials::AdminCredentials,
  record::{IdentityRecord, NewRecord, RecordId, RecordPatch},
  store::{RecordStore, SettingsStore},
};

use crate::{
  Error, Result,
  document::{
    ADMIN_DOCUMENT, DocumentList, RECORDS_COLLECTION, SETTINGS_COLLECTION,
  },
};

/// Connection settings for the document store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
  pub endpoint: String,
  /// Sent as a bearer token when present.
  pub api_key:  Option<String>,
  pub timeout:  Duration,
}

impl RemoteConfig {
  pub fn new(endpoint: impl Into<String>) -> Self {
    Self {
      endpoint: endpoint.into(),
      api_key:  None,
      timeout:  Duration::from_secs(10),
    }
  }
}

/// An IDVerify record store backed by a remote document collection.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based. Updates
/// replace the whole document; concurrent writers are not detected and the
/// last write wins.
#[derive(Clone)]
pub struct RemoteStore {
  client: Client,
  config: RemoteConfig,
}

impl RemoteStore {
  pub fn new(config: RemoteConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  fn collection_url(&self, collection: &str) -> String {
    format!(
      "{}/collections/{collection}/documents",
      self.config.endpoint.trim_end_matches('/')
    )
  }

  fn document_url(&self, collection: &str, id: &str) -> String {
    format!("{}/{id}", self.collection_url(collection))
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.api_key {
      Some(key) => req.bearer_auth(key),
      None => req,
    }
  }

  /// `GET` a document; `Ok(None)` on 404.
  async fn fetch<T: DeserializeOwned>(&self, url: String) -> Result<Option<T>> {
    let resp = self.auth(self.client.get(&url)).send().await?;
    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => Ok(Some(resp.json().await?)),
      status => Err(Error::Status { method: "GET", url, status }),
    }
  }

  /// `PUT` a whole document, creating or replacing it.
  async fn put<T: Serialize + Sync>(&self, url: String, doc: &T) -> Result<()> {
    let resp = self.auth(self.client.put(&url)).json(doc).send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status { method: "PUT", url, status: resp.status() });
    }
    Ok(())
  }

  /// `DELETE` a document; `Ok(false)` on 404.
  async fn remove(&self, url: String) -> Result<bool> {
    let resp = self.auth(self.client.delete(&url)).send().await?;
    match resp.status() {
      StatusCode::NOT_FOUND => Ok(false),
      s if s.is_success() => Ok(true),
      status => Err(Error::Status { method: "DELETE", url, status }),
    }
  }

  fn record_url(&self, id: &RecordId) -> String {
    self.document_url(RECORDS_COLLECTION, id.as_str())
  }

  fn admin_url(&self) -> String {
    self.document_url(SETTINGS_COLLECTION, ADMIN_DOCUMENT)
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for RemoteStore {
  type Error = Error;

  async fn list(&self) -> Vec<IdentityRecord> {
    let url = self.collection_url(RECORDS_COLLECTION);
    match self.fetch::<DocumentList>(url).await {
      Ok(Some(list)) => list.into_records(),
      Ok(None) => Vec::new(),
      Err(e) => {
        tracing::warn!(error = %e, "failed to list records; reporting empty collection");
        Vec::new()
      }
    }
  }

  async fn get_by_id(&self, id: RecordId) -> Option<IdentityRecord> {
    match self.fetch(self.record_url(&id)).await {
      Ok(record) => record,
      Err(e) => {
        tracing::warn!(%id, error = %e, "failed to fetch record; treating as absent");
        None
      }
    }
  }

  async fn create(&self, input: NewRecord) -> Result<RecordId> {
    input.validate()?;
    let id = input.id.clone().unwrap_or_else(RecordId::generate);
    let url = self.record_url(&id);

    if self.fetch::<serde_json::Value>(url.clone()).await?.is_some() {
      return Err(idverify_core::Error::DuplicateId(id).into());
    }

    let record = input.into_record(id.clone(), Utc::now());
    self.put(url, &record).await?;
    tracing::info!(%id, "record created");
    Ok(id)
  }

  async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<bool> {
    patch.validate()?;
    let url = self.record_url(&id);

    let Some(mut record) = self.fetch::<IdentityRecord>(url.clone()).await?
    else {
      return Ok(false);
    };
    patch.apply(&mut record, Utc::now());
    self.put(url, &record).await?;
    tracing::info!(%id, "record updated");
    Ok(true)
  }

  async fn delete(&self, id: RecordId) -> Result<bool> {
    let removed = self.remove(self.record_url(&id)).await?;
    if removed {
      tracing::info!(%id, "record deleted");
    }
    Ok(removed)
  }
}

// ─── SettingsStore impl ──────────────────────────────────────────────────────

impl SettingsStore for RemoteStore {
  async fn load_credentials(&self) -> Result<Option<AdminCredentials>> {
    self.fetch(self.admin_url()).await
  }

  async fn save_credentials(&self, credentials: AdminCredentials) -> Result<()> {
    self.put(self.admin_url(), &credentials).await
  }
}
