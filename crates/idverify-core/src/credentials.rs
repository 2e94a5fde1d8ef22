//! The singleton admin credential record.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Username plus an argon2 PHC string. There is exactly one admin account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

impl AdminCredentials {
  pub fn new(
    username: impl Into<String>,
    password_hash: impl Into<String>,
  ) -> Result<Self> {
    let username = username.into().trim().to_owned();
    if username.is_empty() {
      return Err(Error::EmptyUsername);
    }
    Ok(Self { username, password_hash: password_hash.into() })
  }
}
