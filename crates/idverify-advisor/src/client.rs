//! [`GeminiAdvisor`]: HTTP client for the advisory model.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde_json::{Value, json};

use idverify_core::{
  record::IdentityRecord,
  verify::{Advisor, AdvisoryVerdict, DEFAULT_ADVISORY_TIMEOUT, local_summary},
};

use crate::{
  Error, Result,
  prompt::{judge_prompt, summary_prompt, verdict_schema},
};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const NO_SUMMARY: &str = "No summary available.";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Connection settings for the advisory model.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
  pub api_key:  String,
  pub model:    String,
  /// Base URL, or a full `...:generateContent` URL.
  pub endpoint: String,
  /// Per-request HTTP timeout.
  pub timeout:  Duration,
}

impl GeminiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:  api_key.into(),
      model:    DEFAULT_MODEL.to_owned(),
      endpoint: DEFAULT_ENDPOINT.to_owned(),
      timeout:  DEFAULT_ADVISORY_TIMEOUT,
    }
  }
}

/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct GeminiAdvisor {
  client:  Client,
  url:     Url,
  api_key: String,
}

impl GeminiAdvisor {
  pub fn new(config: GeminiConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    let url = resolve_endpoint(&config.endpoint, &config.model)?;
    Ok(Self { client, url, api_key: config.api_key })
  }

  /// One `generateContent` round trip; returns the concatenated text parts.
  async fn generate(&self, prompt: String, schema: Option<Value>) -> Result<String> {
    let mut payload = json!({
      "contents": [{ "parts": [{ "text": prompt }] }]
    });
    if let Some(schema) = schema {
      payload["generationConfig"] = json!({
        "responseMimeType": "application/json",
        "responseSchema":   schema,
      });
    }

    let resp = self
      .client
      .post(self.url.clone())
      .header(API_KEY_HEADER, &self.api_key)
      .json(&payload)
      .send()
      .await?;
    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status, body: truncate(&body, 320) });
    }

    let body: Value = resp.json().await?;
    let text = body["candidates"]
      .as_array()
      .and_then(|candidates| candidates.first())
      .and_then(|candidate| candidate["content"]["parts"].as_array())
      .map(|parts| {
        parts
          .iter()
          .filter_map(|part| part["text"].as_str())
          .collect::<Vec<_>>()
          .join("\n")
      })
      .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
      return Err(Error::EmptyResponse);
    }
    Ok(text.to_owned())
  }
}

impl Advisor for GeminiAdvisor {
  type Error = Error;

  async fn judge<'a>(
    &'a self,
    record: &'a IdentityRecord,
    today: NaiveDate,
  ) -> Result<AdvisoryVerdict> {
    let text = self
      .generate(judge_prompt(record, today), Some(verdict_schema()))
      .await?;
    let verdict: AdvisoryVerdict = serde_json::from_str(&text)?;
    tracing::debug!(id = %record.id, allowed = verdict.allowed, "advisory verdict");
    Ok(verdict)
  }

  async fn summarize<'a>(&'a self, record: &'a IdentityRecord) -> String {
    match self.generate(summary_prompt(record), None).await {
      Ok(text) => text,
      Err(Error::EmptyResponse) => NO_SUMMARY.to_owned(),
      Err(e) => {
        tracing::warn!(id = %record.id, error = %e, "summary request failed");
        local_summary(record)
      }
    }
  }
}

/// Accept either a base URL or a full `:generateContent` URL.
fn resolve_endpoint(endpoint: &str, model: &str) -> Result<Url> {
  let raw = if endpoint.contains(":generateContent") {
    endpoint.to_owned()
  } else {
    format!(
      "{}/v1beta/models/{model}:generateContent",
      endpoint.trim_end_matches('/')
    )
  };
  Url::parse(&raw).map_err(|e| Error::InvalidEndpoint(format!("{raw}: {e}")))
}

fn truncate(value: &str, max_chars: usize) -> String {
  match value.char_indices().nth(max_chars) {
    Some((at, _)) => format!("{}…", &value[..at]),
    None => value.to_owned(),
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;

  #[test]
  fn endpoint_from_base() {
    let url = resolve_endpoint("https://example.test/", "m1").unwrap();
    assert_eq!(
      url.as_str(),
      "https://example.test/v1beta/models/m1:generateContent"
    );
    assert!(url.query().is_none());
  }

  #[test]
  fn endpoint_accepts_full_url() {
    let url =
      resolve_endpoint("https://example.test/v1/models/x:generateContent", "ignored")
        .unwrap();
    assert_eq!(url.path(), "/v1/models/x:generateContent");
  }

  #[test]
  fn bad_endpoint_is_rejected() {
    assert!(matches!(
      resolve_endpoint("not a url", "m"),
      Err(Error::InvalidEndpoint(_))
    ));
  }
}
