//! Verification URL template: `<base>#/verify/<id>`.
//!
//! The shape is a wire contract; codes already printed on cards must keep
//! resolving, so it never changes.

use idverify_core::record::RecordId;

use crate::{Error, Result};

pub const VERIFY_FRAGMENT: &str = "#/verify/";

/// Build the verification link for `id` under the deployment `base`.
///
/// `base` is used as given (origin plus path, with or without a trailing
/// `/`). Ids cannot contain `/`, `#`, `?` or whitespace, so distinct ids
/// always yield distinct links.
pub fn encode_url(base: &str, id: &RecordId) -> String {
  format!("{base}{VERIFY_FRAGMENT}{id}")
}

/// Recover the id from a link produced by [`encode_url`].
pub fn extract_id(url: &str) -> Result<RecordId> {
  let Some((_, raw)) = url.split_once(VERIFY_FRAGMENT) else {
    return Err(Error::NotAVerificationUrl(url.to_owned()));
  };
  Ok(RecordId::parse(raw)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn id(raw: &str) -> RecordId { RecordId::parse(raw).unwrap() }

  #[test]
  fn url_shape() {
    assert_eq!(
      encode_url("https://cards.example.org/", &id("abc-123")),
      "https://cards.example.org/#/verify/abc-123"
    );
    assert_eq!(
      encode_url("https://cards.example.org/app", &id("x")),
      "https://cards.example.org/app#/verify/x"
    );
  }

  #[test]
  fn extract_round_trips() {
    let base = "http://localhost:8080/";
    for raw in ["abc", "3f1c9a2e-0000-4000-8000-000000000000", "EMP_0042"] {
      let url = encode_url(base, &id(raw));
      assert_eq!(extract_id(&url).unwrap(), id(raw));
    }
  }

  #[test]
  fn distinct_ids_give_distinct_urls() {
    let base = "https://cards.example.org/";
    let ids = ["a", "ab", "a-b", "b", "A"];
    let mut urls: Vec<_> = ids.iter().map(|r| encode_url(base, &id(r))).collect();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), ids.len());
  }

  #[test]
  fn extract_rejects_foreign_links() {
    assert!(matches!(
      extract_id("https://example.org/profile/abc"),
      Err(Error::NotAVerificationUrl(_))
    ));
    assert!(matches!(
      extract_id("https://example.org/#/verify/"),
      Err(Error::Core(_))
    ));
  }
}
