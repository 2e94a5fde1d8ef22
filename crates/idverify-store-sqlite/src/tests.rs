//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use idverify_core::{
  credentials::AdminCredentials,
  record::{CustomField, NewRecord, RecordId, RecordPatch, RecordStatus},
  store::{RecordStore, SettingsStore},
};

use crate::{Error, SqliteStore, schema::RECORDS_SLOT};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn alice() -> NewRecord {
  let mut input = NewRecord::new("Alice", date(2099, 1, 1));
  input.department = "Computer Science".into();
  input.employee_number = "2024-CS-001".into();
  input
}

/// Every optional field set, custom fields in a deliberate order.
fn fully_populated() -> NewRecord {
  let mut input = alice();
  input.designation = "Professor".into();
  input.photo = Some("data:image/png;base64,iVBORw0KGgo=".into());
  input.custom_fields = vec![
    CustomField::new("Blood group", "O+"),
    CustomField::new("Access", "Lab 3"),
  ];
  input.status = RecordStatus::Suspended;
  input
}

async fn overwrite_slot(s: &SqliteStore, value: &'static str) {
  s.conn
    .call(move |conn| {
      conn.execute(
        "INSERT OR REPLACE INTO slots (slot_key, value, updated_at) \
         VALUES (?1, ?2, '2024-01-01T00:00:00Z')",
        rusqlite::params![RECORDS_SLOT, value],
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

// ─── Records ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_lists_nothing() {
  let s = store().await;
  assert!(s.list().await.is_empty());
}

#[tokio::test]
async fn create_and_get() {
  let s = store().await;
  let id = s.create(alice()).await.unwrap();

  let record = s.get_by_id(id.clone()).await.expect("record present");
  assert_eq!(record.id, id);
  assert_eq!(record.name, "Alice");
  assert_eq!(record.valid_till, date(2099, 1, 1));
  assert_eq!(record.created_at, record.updated_at);
}

#[tokio::test]
async fn get_returns_every_field_as_created() {
  let s = store().await;
  let input = fully_populated();
  let id = s.create(input.clone()).await.unwrap();

  let got = s.get_by_id(id.clone()).await.expect("record present");
  let mut expected = input.into_record(id, got.created_at);
  expected.updated_at = got.updated_at;
  assert_eq!(got, expected);

  let labels: Vec<_> = got.custom_fields.iter().map(|f| f.label.as_str()).collect();
  assert_eq!(labels, ["Blood group", "Access"]);
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  let id = RecordId::parse("nonexistent").unwrap();
  assert!(s.get_by_id(id).await.is_none());
}

#[tokio::test]
async fn create_keeps_caller_supplied_id() {
  let s = store().await;
  let mut input = alice();
  input.id = Some(RecordId::parse("card-7").unwrap());

  let id = s.create(input).await.unwrap();
  assert_eq!(id.as_str(), "card-7");
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
  let s = store().await;
  let mut input = alice();
  input.id = Some(RecordId::parse("card-7").unwrap());
  s.create(input.clone()).await.unwrap();

  let err = s.create(input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(idverify_core::Error::DuplicateId(_))
  ));
  assert_eq!(s.list().await.len(), 1);
}

#[tokio::test]
async fn create_rejects_blank_name() {
  let s = store().await;
  let err = s
    .create(NewRecord::new("   ", date(2099, 1, 1)))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(idverify_core::Error::EmptyName)));
  assert!(s.list().await.is_empty());
}

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let first = s.create(NewRecord::new("First", date(2099, 1, 1))).await.unwrap();
  let second = s.create(NewRecord::new("Second", date(2099, 1, 1))).await.unwrap();

  let ids: Vec<_> = s.list().await.into_iter().map(|r| r.id).collect();
  assert_eq!(ids, vec![second, first]);
}

#[tokio::test]
async fn sequential_updates_last_write_wins() {
  let s = store().await;
  let id = s.create(alice()).await.unwrap();

  for department in ["X", "Y"] {
    let patch = RecordPatch {
      department: Some(department.into()),
      ..RecordPatch::default()
    };
    assert!(s.update(id.clone(), patch).await.unwrap());
  }

  let record = s.get_by_id(id).await.unwrap();
  assert_eq!(record.department, "Y");
  assert!(record.updated_at >= record.created_at);
}

#[tokio::test]
async fn update_leaves_unsupplied_fields() {
  let s = store().await;
  let id = s.create(alice()).await.unwrap();

  let patch = RecordPatch {
    custom_fields: Some(vec![CustomField::new("Blood group", "O+")]),
    ..RecordPatch::default()
  };
  s.update(id.clone(), patch).await.unwrap();

  let record = s.get_by_id(id).await.unwrap();
  assert_eq!(record.name, "Alice");
  assert_eq!(record.department, "Computer Science");
  assert_eq!(record.custom_fields.len(), 1);
  assert_eq!(record.custom_fields[0].value, "O+");
}

#[tokio::test]
async fn update_missing_is_a_no_op() {
  let s = store().await;
  let patch = RecordPatch {
    name: Some("Ghost".into()),
    ..RecordPatch::default()
  };
  let updated = s
    .update(RecordId::parse("ghost").unwrap(), patch)
    .await
    .unwrap();
  assert!(!updated);
  assert!(s.list().await.is_empty());
}

#[tokio::test]
async fn delete_is_idempotent() {
  let s = store().await;
  let id = s.create(alice()).await.unwrap();

  assert!(s.delete(id.clone()).await.unwrap());
  assert!(!s.delete(id.clone()).await.unwrap());
  assert!(s.get_by_id(id).await.is_none());
}

#[tokio::test]
async fn search_filters_by_name_department_and_number() {
  let s = store().await;
  s.create(alice()).await.unwrap();
  let mut bob = NewRecord::new("Bob", date(2099, 1, 1));
  bob.department = "Physics".into();
  s.create(bob).await.unwrap();

  assert_eq!(s.search("ALICE".into()).await.len(), 1);
  assert_eq!(s.search("physics".into()).await.len(), 1);
  assert_eq!(s.search("CS-001".into()).await.len(), 1);
  assert_eq!(s.search(String::new()).await.len(), 2);
}

// ─── Corrupt collection ──────────────────────────────────────────────────────

#[tokio::test]
async fn corrupt_collection_reads_as_empty() {
  let s = store().await;
  s.create(alice()).await.unwrap();
  overwrite_slot(&s, "{not json").await;

  assert!(s.list().await.is_empty());
  assert!(s.get_by_id(RecordId::parse("x").unwrap()).await.is_none());
}

#[tokio::test]
async fn corrupt_collection_is_not_overwritten() {
  let s = store().await;
  overwrite_slot(&s, "{not json").await;

  let err = s.create(alice()).await.unwrap_err();
  assert!(matches!(err, Error::CorruptSlot { .. }));

  let raw: String = s
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT value FROM slots WHERE slot_key = ?1",
        rusqlite::params![RECORDS_SLOT],
        |row| row.get(0),
      )?)
    })
    .await
    .unwrap();
  assert_eq!(raw, "{not json");
}

// ─── Credentials ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn credentials_absent_until_saved() {
  let s = store().await;
  assert!(s.load_credentials().await.unwrap().is_none());

  let creds = AdminCredentials::new("admin", "$argon2id$v=19$stub").unwrap();
  s.save_credentials(creds.clone()).await.unwrap();
  assert_eq!(s.load_credentials().await.unwrap(), Some(creds));

  let changed = AdminCredentials::new("root", "$argon2id$v=19$other").unwrap();
  s.save_credentials(changed.clone()).await.unwrap();
  assert_eq!(s.load_credentials().await.unwrap(), Some(changed));
}

#[tokio::test]
async fn credentials_live_outside_the_collection() {
  let s = store().await;
  s.save_credentials(AdminCredentials::new("admin", "h").unwrap())
    .await
    .unwrap();
  assert!(s.list().await.is_empty());
}

// ─── On disk ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn records_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("idverify.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create(alice()).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let record = s.get_by_id(id).await.expect("persisted record");
  assert_eq!(record.name, "Alice");
}
