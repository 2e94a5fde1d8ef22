//! The verification resolver: id → record → verdict.
//!
//! ```text
//! Loading ──► NotFound          (no record for the id)
//!    │
//!    ├──────► Valid / Invalid   (date-only verdict, optionally overridden
//!                                by an advisor's answer)
//! ```
//!
//! All non-`Loading` states are terminal. An advisor that errors or exceeds
//! the configured timeout is replaced by the date-only verdict.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  record::{IdentityRecord, RecordId, RecordStatus},
  store::RecordStore,
};

/// Wait applied to advisory calls when the caller does not configure one.
pub const DEFAULT_ADVISORY_TIMEOUT: Duration = Duration::from_secs(5);

const FALLBACK_SUFFIX: &str = "(Offline Fallback)";

// ─── Advisor ─────────────────────────────────────────────────────────────────

/// An independent eligibility judgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryVerdict {
  pub allowed: bool,
  pub reason:  String,
}

/// A remote (or local) judge consulted after the date check.
pub trait Advisor: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn judge<'a>(
    &'a self,
    record: &'a IdentityRecord,
    today: NaiveDate,
  ) -> impl Future<Output = Result<AdvisoryVerdict, Self::Error>> + Send + 'a;

  /// A short formal profile blurb. Advisors without a text model return the
  /// fixed local sentence.
  fn summarize<'a>(
    &'a self,
    record: &'a IdentityRecord,
  ) -> impl Future<Output = String> + Send + 'a {
    async move { local_summary(record) }
  }
}

/// Fixed blurb used when no text model is available.
pub fn local_summary(record: &IdentityRecord) -> String {
  format!(
    "{} is registered with {}. Profile validated locally.",
    record.name,
    if record.department.is_empty() { "the institution" } else { &record.department },
  )
}

/// Deterministic advisor: allowed iff the record is active and not expired.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAdvisor;

impl Advisor for LocalAdvisor {
  type Error = std::convert::Infallible;

  async fn judge<'a>(
    &'a self,
    record: &'a IdentityRecord,
    today: NaiveDate,
  ) -> Result<AdvisoryVerdict, Self::Error> {
    let verdict = if record.status != RecordStatus::Active {
      AdvisoryVerdict {
        allowed: false,
        reason:  format!("Record status is {}", record.status.as_str()),
      }
    } else if record.is_expired_on(today) {
      AdvisoryVerdict {
        allowed: false,
        reason:  format!("Validity ended on {}", record.valid_till),
      }
    } else {
      AdvisoryVerdict {
        allowed: true,
        reason:  "Active record within its validity period".to_owned(),
      }
    };
    Ok(verdict)
  }
}

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// Resolver state. Only `Loading` is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
  Loading,
  Valid,
  Invalid,
  NotFound,
}

impl VerificationState {
  pub fn is_terminal(&self) -> bool { !matches!(self, Self::Loading) }
}

/// Where the displayed verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
  /// Date comparison only; no advisor was asked.
  Local,
  /// The advisor answered in time.
  Advisory,
  /// The advisor failed or timed out; date comparison used instead.
  Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
  pub allowed: bool,
  /// Banner text: `VERIFIED`, `EXPIRED`, or `ACCESS DENIED`.
  pub label:   String,
  pub reason:  String,
  pub source:  VerdictSource,
}

impl Verdict {
  /// The date-only verdict: valid through the last day of `valid_till`.
  pub fn from_dates(record: &IdentityRecord, today: NaiveDate) -> Self {
    if record.is_expired_on(today) {
      Self {
        allowed: false,
        label:   "EXPIRED".to_owned(),
        reason:  "Identity No Longer Valid".to_owned(),
        source:  VerdictSource::Local,
      }
    } else {
      Self {
        allowed: true,
        label:   "VERIFIED".to_owned(),
        reason:  "Identity Confirmed".to_owned(),
        source:  VerdictSource::Local,
      }
    }
  }

  fn from_advisory(advisory: AdvisoryVerdict) -> Self {
    Self {
      label:   if advisory.allowed { "VERIFIED" } else { "ACCESS DENIED" }
        .to_owned(),
      allowed: advisory.allowed,
      reason:  advisory.reason,
      source:  VerdictSource::Advisory,
    }
  }

  fn into_fallback(mut self) -> Self {
    self.reason = format!("{} {FALLBACK_SUFFIX}", self.reason);
    self.source = VerdictSource::Fallback;
    self
  }
}

/// The outcome of resolving one id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
  pub state:      VerificationState,
  pub record:     Option<IdentityRecord>,
  pub verdict:    Option<Verdict>,
  /// The calendar day (UTC) the verdict was computed for.
  pub checked_on: NaiveDate,
}

impl Verification {
  fn not_found(today: NaiveDate) -> Self {
    Self {
      state:      VerificationState::NotFound,
      record:     None,
      verdict:    None,
      checked_on: today,
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolves verification ids against a store, optionally consulting an
/// advisor with a bounded wait.
pub struct Resolver<S, A> {
  store:   Arc<S>,
  advisor: Option<Arc<A>>,
  timeout: Duration,
}

impl<S, A> Resolver<S, A>
where
  S: RecordStore,
  A: Advisor,
{
  pub fn new(store: Arc<S>, advisor: Option<Arc<A>>, timeout: Duration) -> Self {
    Self { store, advisor, timeout }
  }

  pub fn advisor(&self) -> Option<&A> { self.advisor.as_deref() }

  /// Resolve `raw_id` for today's UTC date, consulting the advisor if one is
  /// configured.
  pub async fn resolve(&self, raw_id: &str) -> Verification {
    self.resolve_on(raw_id, Utc::now().date_naive(), true).await
  }

  /// Resolve `raw_id` as of `today`. With `use_advisor == false` only the
  /// date comparison runs.
  pub async fn resolve_on(
    &self,
    raw_id: &str,
    today: NaiveDate,
    use_advisor: bool,
  ) -> Verification {
    let Ok(id) = RecordId::parse(raw_id) else {
      tracing::debug!(raw_id, "malformed verification id");
      return Verification::not_found(today);
    };

    let Some(record) = self.store.get_by_id(id).await else {
      tracing::info!(raw_id, "verification id not found");
      return Verification::not_found(today);
    };

    let local = Verdict::from_dates(&record, today);
    let verdict = match self.advisor.as_deref().filter(|_| use_advisor) {
      None => local,
      Some(advisor) => {
        match tokio::time::timeout(self.timeout, advisor.judge(&record, today))
          .await
        {
          Ok(Ok(advisory)) => Verdict::from_advisory(advisory),
          Ok(Err(e)) => {
            tracing::warn!(error = %e, id = %record.id, "advisor failed; using date check");
            local.into_fallback()
          }
          Err(_) => {
            tracing::warn!(
              id = %record.id,
              timeout_ms = self.timeout.as_millis() as u64,
              "advisor timed out; using date check"
            );
            local.into_fallback()
          }
        }
      }
    };

    Verification {
      state: if verdict.allowed {
        VerificationState::Valid
      } else {
        VerificationState::Invalid
      },
      record: Some(record),
      verdict: Some(verdict),
      checked_on: today,
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{collections::BTreeMap, sync::Mutex};

  use chrono::TimeZone;

  use super::*;
  use crate::record::{NewRecord, RecordPatch};

  // A minimal in-memory store for exercising the resolver.
  #[derive(Default)]
  struct MemStore(Mutex<BTreeMap<RecordId, IdentityRecord>>);

  impl RecordStore for MemStore {
    type Error = std::convert::Infallible;

    async fn list(&self) -> Vec<IdentityRecord> {
      self.0.lock().unwrap().values().cloned().collect()
    }

    async fn get_by_id(&self, id: RecordId) -> Option<IdentityRecord> {
      self.0.lock().unwrap().get(&id).cloned()
    }

    async fn create(&self, input: NewRecord) -> Result<RecordId, Self::Error> {
      let id = input.id.clone().unwrap_or_else(RecordId::generate);
      let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
      self.0.lock().unwrap().insert(id.clone(), input.into_record(id.clone(), at));
      Ok(id)
    }

    async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<bool, Self::Error> {
      let mut map = self.0.lock().unwrap();
      Ok(match map.get_mut(&id) {
        Some(r) => {
          patch.apply(r, Utc::now());
          true
        }
        None => false,
      })
    }

    async fn delete(&self, id: RecordId) -> Result<bool, Self::Error> {
      Ok(self.0.lock().unwrap().remove(&id).is_some())
    }
  }

  #[derive(Debug, thiserror::Error)]
  #[error("advisor unreachable")]
  struct Unreachable;

  /// Advisor with scripted behaviour.
  enum Scripted {
    Answer(bool),
    Fail,
    Hang,
  }

  impl Advisor for Scripted {
    type Error = Unreachable;

    async fn judge<'a>(
      &'a self,
      _record: &'a IdentityRecord,
      _today: NaiveDate,
    ) -> Result<AdvisoryVerdict, Unreachable> {
      match self {
        Scripted::Answer(allowed) => Ok(AdvisoryVerdict {
          allowed: *allowed,
          reason:  "scripted".into(),
        }),
        Scripted::Fail => Err(Unreachable),
        Scripted::Hang => {
          tokio::time::sleep(Duration::from_secs(3600)).await;
          Err(Unreachable)
        }
      }
    }
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  async fn store_with(valid_till: NaiveDate) -> (Arc<MemStore>, RecordId) {
    let store = Arc::new(MemStore::default());
    let id = store
      .create(NewRecord::new("Alice", valid_till))
      .await
      .unwrap();
    (store, id)
  }

  fn resolver<A: Advisor>(store: Arc<MemStore>, advisor: Option<A>) -> Resolver<MemStore, A> {
    Resolver::new(store, advisor.map(Arc::new), Duration::from_millis(50))
  }

  #[tokio::test]
  async fn unknown_id_is_not_found() {
    let (store, _) = store_with(date(2099, 1, 1)).await;
    let r = resolver::<LocalAdvisor>(store, None);
    let v = r.resolve("nonexistent").await;
    assert_eq!(v.state, VerificationState::NotFound);
    assert!(v.state.is_terminal());
    assert!(v.record.is_none());
  }

  #[tokio::test]
  async fn malformed_id_is_not_found() {
    let (store, _) = store_with(date(2099, 1, 1)).await;
    let r = resolver::<LocalAdvisor>(store, None);
    assert_eq!(r.resolve("a/b").await.state, VerificationState::NotFound);
  }

  #[tokio::test]
  async fn date_only_verdicts_around_the_boundary() {
    let (store, id) = store_with(date(2025, 6, 15)).await;
    let r = resolver::<LocalAdvisor>(store, None);

    let before = r.resolve_on(id.as_str(), date(2025, 6, 14), true).await;
    assert_eq!(before.state, VerificationState::Valid);
    assert_eq!(before.verdict.unwrap().label, "VERIFIED");

    let on_day = r.resolve_on(id.as_str(), date(2025, 6, 15), true).await;
    assert_eq!(on_day.state, VerificationState::Valid);

    let after = r.resolve_on(id.as_str(), date(2025, 6, 16), true).await;
    assert_eq!(after.state, VerificationState::Invalid);
    let verdict = after.verdict.unwrap();
    assert_eq!(verdict.label, "EXPIRED");
    assert_eq!(verdict.source, VerdictSource::Local);
  }

  #[tokio::test]
  async fn advisor_overrides_date_verdict() {
    let (store, id) = store_with(date(2099, 1, 1)).await;
    let r = resolver(store, Some(Scripted::Answer(false)));
    let v = r.resolve_on(id.as_str(), date(2025, 1, 1), true).await;
    assert_eq!(v.state, VerificationState::Invalid);
    let verdict = v.verdict.unwrap();
    assert_eq!(verdict.label, "ACCESS DENIED");
    assert_eq!(verdict.source, VerdictSource::Advisory);
  }

  #[tokio::test]
  async fn advisor_can_be_skipped() {
    let (store, id) = store_with(date(2099, 1, 1)).await;
    let r = resolver(store, Some(Scripted::Answer(false)));
    let v = r.resolve_on(id.as_str(), date(2025, 1, 1), false).await;
    assert_eq!(v.state, VerificationState::Valid);
    assert_eq!(v.verdict.unwrap().source, VerdictSource::Local);
  }

  #[tokio::test]
  async fn failing_advisor_falls_back_to_dates() {
    let (store, id) = store_with(date(2020, 1, 1)).await;
    let r = resolver(store, Some(Scripted::Fail));
    let v = r.resolve_on(id.as_str(), date(2025, 1, 1), true).await;
    assert_eq!(v.state, VerificationState::Invalid);
    let verdict = v.verdict.unwrap();
    assert_eq!(verdict.source, VerdictSource::Fallback);
    assert!(verdict.reason.ends_with("(Offline Fallback)"));
  }

  #[tokio::test]
  async fn hanging_advisor_is_bounded_by_timeout() {
    let (store, id) = store_with(date(2099, 1, 1)).await;
    let r = resolver(store, Some(Scripted::Hang));
    let v = r.resolve_on(id.as_str(), date(2025, 1, 1), true).await;
    assert_eq!(v.state, VerificationState::Valid);
    assert_eq!(v.verdict.unwrap().source, VerdictSource::Fallback);
  }

  #[tokio::test]
  async fn local_advisor_checks_status_and_expiry() {
    let (store, id) = store_with(date(2099, 1, 1)).await;
    store
      .update(id.clone(), RecordPatch {
        status: Some(RecordStatus::Suspended),
        ..RecordPatch::default()
      })
      .await
      .unwrap();
    let r = resolver(store, Some(LocalAdvisor));
    let v = r.resolve_on(id.as_str(), date(2025, 1, 1), true).await;
    assert_eq!(v.state, VerificationState::Invalid);
    assert!(v.verdict.unwrap().reason.contains("suspended"));
  }

  #[tokio::test]
  async fn default_summary_is_local() {
    let (store, id) = store_with(date(2099, 1, 1)).await;
    let record = store.get_by_id(id).await.unwrap();
    let text = LocalAdvisor.summarize(&record).await;
    assert!(text.contains("validated locally"));
  }
}
