//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use idverify_core::{
  credentials::AdminCredentials,
  record::{IdentityRecord, NewRecord, RecordId, RecordPatch},
  store::{RecordStore, SettingsStore},
};

use crate::{
  Error, Result,
  encode::{
    decode_credentials, decode_records, encode_credentials, encode_dt,
    encode_records,
  },
  schema::{ADMIN_SLOT, RECORDS_SLOT, SCHEMA},
};

const SELECT_SLOT: &str = "SELECT value FROM slots WHERE slot_key = ?1";

const UPSERT_SLOT: &str = "
  INSERT INTO slots (slot_key, value, updated_at) VALUES (?1, ?2, ?3)
  ON CONFLICT(slot_key) DO UPDATE
    SET value = excluded.value, updated_at = excluded.updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// An IDVerify record store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. All calls
/// share one connection thread, so read-modify-write cycles from this process
/// never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn read_slot(&self, slot: &'static str) -> Result<Option<String>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(SELECT_SLOT, rusqlite::params![slot], |row| row.get(0))
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }

  async fn write_slot(&self, slot: &'static str, value: String) -> Result<()> {
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(UPSERT_SLOT, rusqlite::params![slot, value, at_str])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Strict read of the whole collection, newest first.
  async fn load_records(&self) -> Result<Vec<IdentityRecord>> {
    let raw = self.read_slot(RECORDS_SLOT).await?;
    decode_records(raw.as_deref())
  }

  /// Run `f` over the collection inside one transaction.
  ///
  /// `f` returns its value plus whether it changed the collection; only a
  /// changed collection is written back (as a whole). A collection that fails
  /// to decode is never overwritten.
  async fn mutate<R, F>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut Vec<IdentityRecord>) -> Result<(R, bool)> + Send + 'static,
    R: Send + 'static,
  {
    let at_str = encode_dt(Utc::now());

    let outcome: Result<R> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw: Option<String> = tx
          .query_row(SELECT_SLOT, rusqlite::params![RECORDS_SLOT], |row| row.get(0))
          .optional()?;

        let mut records = match decode_records(raw.as_deref()) {
          Ok(records) => records,
          Err(e) => {
            return Ok(Err(Error::CorruptSlot {
              slot:   RECORDS_SLOT,
              reason: e.to_string(),
            }));
          }
        };

        let (value, changed) = match f(&mut records) {
          Ok(v) => v,
          Err(e) => return Ok(Err(e)),
        };

        if changed {
          let doc = match encode_records(&records) {
            Ok(doc) => doc,
            Err(e) => return Ok(Err(e)),
          };
          tx.execute(UPSERT_SLOT, rusqlite::params![RECORDS_SLOT, doc, at_str])?;
          tx.commit()?;
        }

        Ok(Ok(value))
      })
      .await?;

    outcome
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn list(&self) -> Vec<IdentityRecord> {
    match self.load_records().await {
      Ok(records) => records,
      Err(e) => {
        tracing::warn!(error = %e, "failed to load records; reporting empty collection");
        Vec::new()
      }
    }
  }

  async fn get_by_id(&self, id: RecordId) -> Option<IdentityRecord> {
    self.list().await.into_iter().find(|r| r.id == id)
  }

  async fn create(&self, input: NewRecord) -> Result<RecordId> {
    input.validate()?;
    let id = input.id.clone().unwrap_or_else(RecordId::generate);
    let record = input.into_record(id.clone(), Utc::now());

    self
      .mutate(move |records| {
        if records.iter().any(|r| r.id == record.id) {
          return Err(idverify_core::Error::DuplicateId(record.id).into());
        }
        records.insert(0, record);
        Ok(((), true))
      })
      .await?;

    tracing::info!(%id, "record created");
    Ok(id)
  }

  async fn update(&self, id: RecordId, patch: RecordPatch) -> Result<bool> {
    patch.validate()?;
    let target = id.clone();

    let updated = self
      .mutate(move |records| {
        let Some(record) = records.iter_mut().find(|r| r.id == target) else {
          return Ok((false, false));
        };
        patch.apply(record, Utc::now());
        Ok((true, true))
      })
      .await?;

    if updated {
      tracing::info!(%id, "record updated");
    }
    Ok(updated)
  }

  async fn delete(&self, id: RecordId) -> Result<bool> {
    let target = id.clone();

    let removed = self
      .mutate(move |records| {
        let before = records.len();
        records.retain(|r| r.id != target);
        let removed = records.len() != before;
        Ok((removed, removed))
      })
      .await?;

    if removed {
      tracing::info!(%id, "record deleted");
    }
    Ok(removed)
  }
}

// ─── SettingsStore impl ──────────────────────────────────────────────────────

impl SettingsStore for SqliteStore {
  async fn load_credentials(&self) -> Result<Option<AdminCredentials>> {
    let raw = self.read_slot(ADMIN_SLOT).await?;
    decode_credentials(raw.as_deref())
  }

  async fn save_credentials(&self, credentials: AdminCredentials) -> Result<()> {
    let doc = encode_credentials(&credentials)?;
    self.write_slot(ADMIN_SLOT, doc).await
  }
}
