//! Identity records: the one entity the store persists.
//!
//! A record is created once with a client-assigned identifier, mutated in
//! place by whole-field replacement, and deleted permanently. There is no
//! history and no tombstone.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Upper bound on the encoded size of an embedded photo data URL.
pub const MAX_PHOTO_BYTES: usize = 1024 * 1024;

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Opaque record identifier. Immutable once assigned.
///
/// Ids travel inside the verification URL fragment, so they may not contain
/// `/`, `#`, `?`, or whitespace.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
  /// A fresh random (UUID v4) identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  /// Accepts 1 to 128 URL-unreserved characters (`A-Z a-z 0-9 - . _ ~`), so
  /// an id reads the same in a path segment, a fragment, and a filename.
  pub fn parse(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    let well_formed = !raw.is_empty()
      && raw.len() <= 128
      && raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));
    if well_formed {
      Ok(Self(raw))
    } else {
      Err(Error::InvalidId(raw))
    }
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for RecordId {
  type Error = Error;

  fn try_from(value: String) -> Result<Self> { Self::parse(value) }
}

impl From<RecordId> for String {
  fn from(id: RecordId) -> Self { id.0 }
}

impl fmt::Display for RecordId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Sub-types ───────────────────────────────────────────────────────────────

/// Administrative status. Only advisors consult it; the date-only verdict
/// ignores it.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
  #[default]
  Active,
  Suspended,
  Inactive,
}

impl RecordStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Suspended => "suspended",
      Self::Inactive => "inactive",
    }
  }
}

/// An ad hoc label/value pair shown on the card (e.g. "Blood group").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
  pub id:    String,
  pub label: String,
  pub value: String,
}

impl CustomField {
  pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      id:    Uuid::new_v4().to_string(),
      label: label.into(),
      value: value.into(),
    }
  }
}

// ─── IdentityRecord ──────────────────────────────────────────────────────────

/// A persisted ID-card record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
  pub id:              RecordId,
  pub name:            String,
  pub employee_number: String,
  pub designation:     String,
  pub department:      String,
  /// Last calendar day on which the card is valid.
  pub valid_till:      NaiveDate,
  /// A `data:image/...;base64,` URL, or `None` for the generated placeholder.
  #[serde(default)]
  pub photo:           Option<String>,
  #[serde(default)]
  pub custom_fields:   Vec<CustomField>,
  #[serde(default)]
  pub status:          RecordStatus,
  /// Assigned at creation; never changes.
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl IdentityRecord {
  /// `true` once `today` is past the last valid day.
  pub fn is_expired_on(&self, today: NaiveDate) -> bool {
    self.valid_till < today
  }

  /// Up to two uppercase initials for the placeholder avatar.
  pub fn initials(&self) -> String {
    let initials: String = self
      .name
      .split_whitespace()
      .filter_map(|part| part.chars().next())
      .take(2)
      .flat_map(char::to_uppercase)
      .collect();
    if initials.is_empty() { "?".to_owned() } else { initials }
  }

  /// Case-insensitive match over name and department, plain substring over
  /// the employee number.
  pub fn matches(&self, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    needle.is_empty()
      || self.name.to_lowercase().contains(&needle)
      || self.department.to_lowercase().contains(&needle)
      || self.employee_number.contains(text.trim())
  }
}

// ─── NewRecord ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::create`].
///
/// `created_at` / `updated_at` are always set by the store. `id` may be
/// pre-assigned by the editor; otherwise the store generates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
  #[serde(default)]
  pub id:              Option<RecordId>,
  pub name:            String,
  #[serde(default)]
  pub employee_number: String,
  #[serde(default)]
  pub designation:     String,
  #[serde(default)]
  pub department:      String,
  pub valid_till:      NaiveDate,
  #[serde(default)]
  pub photo:           Option<String>,
  #[serde(default)]
  pub custom_fields:   Vec<CustomField>,
  #[serde(default)]
  pub status:          RecordStatus,
}

impl NewRecord {
  /// Convenience constructor with every optional field empty.
  pub fn new(name: impl Into<String>, valid_till: NaiveDate) -> Self {
    Self {
      id: None,
      name: name.into(),
      employee_number: String::new(),
      designation: String::new(),
      department: String::new(),
      valid_till,
      photo: None,
      custom_fields: Vec::new(),
      status: RecordStatus::default(),
    }
  }

  pub fn validate(&self) -> Result<()> {
    validate_name(&self.name)?;
    if let Some(photo) = &self.photo {
      validate_photo(photo)?;
    }
    validate_custom_fields(&self.custom_fields)
  }

  /// Materialise the record under `id`, stamped at `now`.
  pub fn into_record(self, id: RecordId, now: DateTime<Utc>) -> IdentityRecord {
    IdentityRecord {
      id,
      name: self.name.trim().to_owned(),
      employee_number: self.employee_number,
      designation: self.designation,
      department: self.department,
      valid_till: self.valid_till,
      photo: self.photo.filter(|p| !p.is_empty()),
      custom_fields: self.custom_fields,
      status: self.status,
      created_at: now,
      updated_at: now,
    }
  }
}

// ─── RecordPatch ─────────────────────────────────────────────────────────────

/// Partial update: only the `Some` fields are replaced.
///
/// An empty `photo` string removes the photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordPatch {
  pub name:            Option<String>,
  pub employee_number: Option<String>,
  pub designation:     Option<String>,
  pub department:      Option<String>,
  pub valid_till:      Option<NaiveDate>,
  pub photo:           Option<String>,
  pub custom_fields:   Option<Vec<CustomField>>,
  pub status:          Option<RecordStatus>,
}

impl RecordPatch {
  pub fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      validate_name(name)?;
    }
    if let Some(photo) = self.photo.as_deref().filter(|p| !p.is_empty()) {
      validate_photo(photo)?;
    }
    if let Some(fields) = &self.custom_fields {
      validate_custom_fields(fields)?;
    }
    Ok(())
  }

  /// Replace the supplied fields of `record` and bump `updated_at`.
  pub fn apply(self, record: &mut IdentityRecord, now: DateTime<Utc>) {
    if let Some(name) = self.name {
      record.name = name.trim().to_owned();
    }
    if let Some(number) = self.employee_number {
      record.employee_number = number;
    }
    if let Some(designation) = self.designation {
      record.designation = designation;
    }
    if let Some(department) = self.department {
      record.department = department;
    }
    if let Some(valid_till) = self.valid_till {
      record.valid_till = valid_till;
    }
    if let Some(photo) = self.photo {
      record.photo = (!photo.is_empty()).then_some(photo);
    }
    if let Some(fields) = self.custom_fields {
      record.custom_fields = fields;
    }
    if let Some(status) = self.status {
      record.status = status;
    }
    record.updated_at = now;
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::EmptyName);
  }
  Ok(())
}

fn validate_photo(photo: &str) -> Result<()> {
  let Some((header, _)) = photo.split_once(',') else {
    return Err(Error::InvalidPhoto);
  };
  if !header.starts_with("data:image/") || !header.ends_with(";base64") {
    return Err(Error::InvalidPhoto);
  }
  if photo.len() > MAX_PHOTO_BYTES {
    return Err(Error::PhotoTooLarge {
      size: photo.len(),
      max:  MAX_PHOTO_BYTES,
    });
  }
  Ok(())
}

fn validate_custom_fields(fields: &[CustomField]) -> Result<()> {
  if fields.iter().any(|f| f.label.trim().is_empty()) {
    return Err(Error::EmptyFieldLabel);
  }
  Ok(())
}
