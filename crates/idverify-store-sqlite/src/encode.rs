//! Encoding between domain types and the JSON documents stored in slots.

use chrono::{DateTime, Utc};
use idverify_core::{
  credentials::AdminCredentials,
  record::IdentityRecord,
  store::sort_newest_first,
};

use crate::Result;

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

/// An absent slot decodes as an empty collection.
pub fn decode_records(raw: Option<&str>) -> Result<Vec<IdentityRecord>> {
  let Some(raw) = raw else {
    return Ok(Vec::new());
  };
  let mut records: Vec<IdentityRecord> = serde_json::from_str(raw)?;
  sort_newest_first(&mut records);
  Ok(records)
}

pub fn encode_records(records: &[IdentityRecord]) -> Result<String> {
  Ok(serde_json::to_string(records)?)
}

pub fn decode_credentials(raw: Option<&str>) -> Result<Option<AdminCredentials>> {
  raw.map(serde_json::from_str).transpose().map_err(Into::into)
}

pub fn encode_credentials(credentials: &AdminCredentials) -> Result<String> {
  Ok(serde_json::to_string(credentials)?)
}
