use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error(transparent)]
  Core(#[from] idverify_core::Error),

  #[error(transparent)]
  Api(#[from] idverify_api::ApiError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
