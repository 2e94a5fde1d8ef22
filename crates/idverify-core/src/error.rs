//! Error types for `idverify-core`.

use thiserror::Error;

use crate::record::RecordId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid record id: {0:?}")]
  InvalidId(String),

  #[error("record {0} already exists")]
  DuplicateId(RecordId),

  #[error("name must not be blank")]
  EmptyName,

  #[error("custom field label must not be blank")]
  EmptyFieldLabel,

  #[error("photo must be a base64 image data URL")]
  InvalidPhoto,

  #[error("photo is {size} bytes; the limit is {max}")]
  PhotoTooLarge { size: usize, max: usize },

  #[error("admin username must not be blank")]
  EmptyUsername,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
