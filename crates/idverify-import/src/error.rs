//! Error types for the bulk importer.
//!
//! Only whole-document problems are errors; a bad row is defaulted, never
//! rejected.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown import format {0:?} (expected json, csv or table)")]
  UnknownFormat(String),

  #[error("expected an array of employees or an object with an \"employees\" array")]
  UnsupportedShape,

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
