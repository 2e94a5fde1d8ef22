//! `GeminiAdvisor` against a mock model endpoint, alone and behind the
//! resolver.

use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, TimeZone, Utc};
use idverify_core::{
  record::{IdentityRecord, NewRecord, RecordId},
  store::RecordStore,
  verify::{Advisor, Resolver, VerdictSource, VerificationState, local_summary},
};
use idverify_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{body_partial_json, header, method, path},
};

use crate::{Error, GeminiAdvisor, GeminiConfig};

const GENERATE: &str = "/v1beta/models/test-model:generateContent";

fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2025, 6, 1).unwrap() }

fn advisor_for(server: &MockServer) -> GeminiAdvisor {
  let mut config = GeminiConfig::new("test-key");
  config.endpoint = server.uri();
  config.model = "test-model".into();
  GeminiAdvisor::new(config).unwrap()
}

fn record() -> IdentityRecord {
  let mut input = NewRecord::new("Alice Johnson", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
  input.department = "Computer Science".into();
  input.into_record(
    RecordId::parse("alice").unwrap(),
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
  )
}

fn text_reply(text: &str) -> Value {
  json!({
    "candidates": [{ "content": { "parts": [{ "text": text }] } }]
  })
}

// ─── judge ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn judge_requests_json_and_parses_verdict() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path(GENERATE))
    .and(header("x-goog-api-key", "test-key"))
    .and(body_partial_json(json!({
      "generationConfig": { "responseMimeType": "application/json" }
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
      r#"{"allowed": false, "reason": "Card holder is suspended"}"#,
    )))
    .expect(1)
    .mount(&server)
    .await;

  let verdict = advisor_for(&server).judge(&record(), today()).await.unwrap();
  assert!(!verdict.allowed);
  assert_eq!(verdict.reason, "Card holder is suspended");
}

#[tokio::test]
async fn judge_surfaces_http_errors() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
    .mount(&server)
    .await;

  let err = advisor_for(&server).judge(&record(), today()).await.unwrap_err();
  assert!(matches!(err, Error::Status { .. }));
}

#[tokio::test]
async fn judge_rejects_non_json_text() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("Looks fine to me")))
    .mount(&server)
    .await;

  let err = advisor_for(&server).judge(&record(), today()).await.unwrap_err();
  assert!(matches!(err, Error::Malformed(_)));
}

#[tokio::test]
async fn transport_errors_do_not_leak_the_key() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(text_reply(r#"{"allowed": true, "reason": "ok"}"#))
        .set_delay(Duration::from_secs(2)),
    )
    .mount(&server)
    .await;

  let mut config = GeminiConfig::new("SECRET-KEY-123");
  config.endpoint = server.uri();
  config.timeout = Duration::from_millis(100);
  let advisor = GeminiAdvisor::new(config).unwrap();

  let err = advisor.judge(&record(), today()).await.unwrap_err();
  assert!(matches!(err, Error::Http(_)));
  let shown = format!("{err} {err:?}");
  assert!(!shown.contains("SECRET-KEY-123"), "{shown}");
}

// ─── summarize ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn summarize_returns_model_text() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .and(path(GENERATE))
    .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
      "  Alice Johnson serves in Computer Science. Her profile is in good standing.\n",
    )))
    .mount(&server)
    .await;

  let summary = advisor_for(&server).summarize(&record()).await;
  assert_eq!(
    summary,
    "Alice Johnson serves in Computer Science. Her profile is in good standing."
  );
}

#[tokio::test]
async fn summarize_falls_back_locally() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(500))
    .mount(&server)
    .await;

  let r = record();
  assert_eq!(advisor_for(&server).summarize(&r).await, local_summary(&r));
}

#[tokio::test]
async fn summarize_empty_reply() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
    .mount(&server)
    .await;

  assert_eq!(
    advisor_for(&server).summarize(&record()).await,
    "No summary available."
  );
}

// ─── Behind the resolver ─────────────────────────────────────────────────────

async fn seeded_store() -> Arc<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let mut input = NewRecord::new("Alice Johnson", NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
  input.id = Some(RecordId::parse("alice").unwrap());
  store.create(input).await.unwrap();
  Arc::new(store)
}

#[tokio::test]
async fn advisor_denial_overrides_dates() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
      r#"{"allowed": false, "reason": "Status check failed"}"#,
    )))
    .mount(&server)
    .await;

  let resolver = Resolver::new(
    seeded_store().await,
    Some(Arc::new(advisor_for(&server))),
    Duration::from_secs(5),
  );
  let v = resolver.resolve_on("alice", today(), true).await;

  assert_eq!(v.state, VerificationState::Invalid);
  let verdict = v.verdict.unwrap();
  assert_eq!(verdict.label, "ACCESS DENIED");
  assert_eq!(verdict.source, VerdictSource::Advisory);
}

#[tokio::test]
async fn slow_advisor_falls_back_within_timeout() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(
      ResponseTemplate::new(200)
        .set_body_json(text_reply(r#"{"allowed": false, "reason": "late"}"#))
        .set_delay(Duration::from_secs(2)),
    )
    .mount(&server)
    .await;

  let resolver = Resolver::new(
    seeded_store().await,
    Some(Arc::new(advisor_for(&server))),
    Duration::from_millis(100),
  );
  let v = resolver.resolve_on("alice", today(), true).await;

  assert_eq!(v.state, VerificationState::Valid);
  let verdict = v.verdict.unwrap();
  assert_eq!(verdict.source, VerdictSource::Fallback);
  assert!(verdict.reason.ends_with("(Offline Fallback)"));
}

#[tokio::test]
async fn unknown_id_never_reaches_advisor() {
  let server = MockServer::start().await;
  Mock::given(method("POST"))
    .respond_with(ResponseTemplate::new(200))
    .expect(0)
    .mount(&server)
    .await;

  let resolver = Resolver::new(
    seeded_store().await,
    Some(Arc::new(advisor_for(&server))),
    Duration::from_secs(5),
  );
  let v = resolver.resolve_on("nonexistent", today(), true).await;
  assert_eq!(v.state, VerificationState::NotFound);
}
