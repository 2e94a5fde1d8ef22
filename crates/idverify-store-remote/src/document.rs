//! Wire shapes exchanged with the document store.

use idverify_core::{record::IdentityRecord, store::sort_newest_first};
use serde::Deserialize;

pub const RECORDS_COLLECTION: &str = "employees";
pub const SETTINGS_COLLECTION: &str = "settings";
pub const ADMIN_DOCUMENT: &str = "admin";

/// Body of a collection listing.
#[derive(Debug, Deserialize)]
pub struct DocumentList {
  #[serde(default)]
  pub documents: Vec<serde_json::Value>,
}

impl DocumentList {
  /// Decode every document that parses as a record; the rest are logged and
  /// skipped so one bad document does not hide the collection.
  pub fn into_records(self) -> Vec<IdentityRecord> {
    let mut records: Vec<IdentityRecord> = self
      .documents
      .into_iter()
      .filter_map(|doc| match serde_json::from_value(doc) {
        Ok(record) => Some(record),
        Err(e) => {
          tracing::warn!(error = %e, "skipping undecodable record document");
          None
        }
      })
      .collect();
    sort_newest_first(&mut records);
    records
  }
}
