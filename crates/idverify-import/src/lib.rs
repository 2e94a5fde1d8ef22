//! Best-effort bulk importer for identity records.
//!
//! Turns loosely structured text into [`NewRecord`]s ready for
//! [`RecordStore::create`](idverify_core::store::RecordStore::create). Keys
//! are matched case-insensitively against a fixed alias table and every
//! missing or unparseable field gets a fixed default, so a row is never
//! rejected. Every produced record passes [`NewRecord::validate`].
//!
//! ```no_run
//! use idverify_import::{ImportFormat, import};
//!
//! let report = import(r#"[{"Name": "Bob"}]"#, ImportFormat::Json).unwrap();
//! assert_eq!(report.accepted, 1);
//! ```

mod delimited;
mod fields;
mod json;
mod table;

pub mod error;

use std::str::FromStr;

pub use error::{Error, Result};
pub use fields::{
  DEFAULT_DEPARTMENT, DEFAULT_DESIGNATION, DEFAULT_NAME, default_valid_till,
  parse_date,
};
use idverify_core::record::NewRecord;

// ─── Formats ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
  /// An array of objects, or `{ "employees": [...] }`.
  Json,
  /// Comma, semicolon or tab separated, optional header row.
  Delimited,
  /// Whitespace-aligned text table (PDF text).
  Table,
}

impl FromStr for ImportFormat {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "json" => Ok(Self::Json),
      "csv" | "delimited" => Ok(Self::Delimited),
      "table" | "text" | "pdf" => Ok(Self::Table),
      other => Err(Error::UnknownFormat(other.to_owned())),
    }
  }
}

/// Guess the format from the content.
pub fn detect_format(input: &str) -> ImportFormat {
  let trimmed = input.trim_start();
  if trimmed.starts_with('[') || trimmed.starts_with('{') {
    return ImportFormat::Json;
  }
  let first = trimmed.lines().next().unwrap_or_default();
  if first.contains([',', ';', '\t']) {
    ImportFormat::Delimited
  } else {
    ImportFormat::Table
  }
}

// ─── Import ──────────────────────────────────────────────────────────────────

/// Outcome of one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
  pub records:          Vec<NewRecord>,
  /// Rows turned into records (always `records.len()`).
  pub accepted:         usize,
  /// Total number of fields filled from defaults, across all rows.
  pub defaulted_fields: usize,
}

/// Parse `input` as `format`.
///
/// Fails only when a JSON document has the wrong overall shape; text
/// formats never fail and may yield an empty report.
pub fn import(input: &str, format: ImportFormat) -> Result<ImportReport> {
  let rows = match format {
    ImportFormat::Json => json::parse(input)?,
    ImportFormat::Delimited => delimited::parse(input),
    ImportFormat::Table => table::parse(input),
  };

  let mut report = ImportReport::default();
  for row in rows {
    let (record, defaulted) = row.finish();
    report.defaulted_fields += defaulted;
    report.records.push(record);
  }
  report.accepted = report.records.len();
  Ok(report)
}
