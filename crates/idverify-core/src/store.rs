//! The `RecordStore` and `SettingsStore` traits.
//!
//! Implemented by storage backends (`idverify-store-sqlite`,
//! `idverify-store-remote`). The HTTP layer and the resolver depend on these
//! traits only; the backend is chosen once at startup.

use std::future::Future;

use crate::{
  credentials::AdminCredentials,
  record::{IdentityRecord, NewRecord, RecordId, RecordPatch},
};

/// Abstraction over the identity-record collection.
///
/// Reads fail open: a backend that cannot read its medium logs the failure
/// and reports an empty collection (or an absent record). Writes persist the
/// full updated state before returning and surface failures to the caller.
/// There is no isolation between writers; the last write wins.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All records, newest first by `created_at`.
  fn list(&self) -> impl Future<Output = Vec<IdentityRecord>> + Send + '_;

  /// Look up a record. `None` is the normal answer for an unknown id.
  fn get_by_id(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Option<IdentityRecord>> + Send + '_;

  /// Persist a new record and return its id.
  ///
  /// Uses `input.id` when supplied, otherwise generates one. Returns an
  /// error if the supplied id is already taken.
  fn create(
    &self,
    input: NewRecord,
  ) -> impl Future<Output = Result<RecordId, Self::Error>> + Send + '_;

  /// Replace the supplied fields. Returns `false` (and writes nothing) when
  /// the record does not exist.
  fn update(
    &self,
    id: RecordId,
    patch: RecordPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Remove a record permanently. Returns `false` when it was already gone.
  fn delete(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Records matching `text`; see [`IdentityRecord::matches`].
  fn search(
    &self,
    text: String,
  ) -> impl Future<Output = Vec<IdentityRecord>> + Send + '_ {
    async move {
      let mut records = self.list().await;
      records.retain(|r| r.matches(&text));
      records
    }
  }
}

/// Persistence for the singleton admin credential document.
pub trait SettingsStore: RecordStore {
  /// `Ok(None)` when no credentials have been stored yet.
  fn load_credentials(
    &self,
  ) -> impl Future<Output = Result<Option<AdminCredentials>, Self::Error>> + Send + '_;

  fn save_credentials(
    &self,
    credentials: AdminCredentials,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

/// Sort newest-first, the order every backend reports.
pub fn sort_newest_first(records: &mut [IdentityRecord]) {
  records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
