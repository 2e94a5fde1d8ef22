//! Error type for `idverify-advisor`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid advisor endpoint {0}")]
  InvalidEndpoint(String),

  #[error("http error: {0}")]
  Http(reqwest::Error),

  #[error("advisor returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("advisor returned no text")]
  EmptyResponse,

  #[error("advisor returned malformed JSON: {0}")]
  Malformed(#[from] serde_json::Error),
}

// Drop the request URL so an endpoint never ends up in a log line.
impl From<reqwest::Error> for Error {
  fn from(e: reqwest::Error) -> Self { Error::Http(e.without_url()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
