//! Error type for `idverify-qr`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] idverify_core::Error),

  #[error("not a verification link: {0:?}")]
  NotAVerificationUrl(String),

  /// The payload does not fit in any QR version at the chosen level.
  #[error("qr encoding failed: {0}")]
  Encode(String),

  #[error("raster size must be positive, got {0}")]
  InvalidSize(u32),

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
