//! Error type for `idverify-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] idverify_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The stored collection cannot be decoded; writes refuse to overwrite it.
  #[error("slot {slot:?} holds an unreadable document: {reason}")]
  CorruptSlot { slot: &'static str, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
