//! SQL schema for the IDVerify SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout; there is no migration path beyond version 1.

/// Slot holding the entire record collection as one JSON array.
pub const RECORDS_SLOT: &str = "idverify_employees";

/// Slot holding the singleton admin credential document.
pub const ADMIN_SLOT: &str = "idverify_admin";

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Named key-value slots. Every write replaces the whole value.
CREATE TABLE IF NOT EXISTS slots (
    slot_key    TEXT PRIMARY KEY,
    value       TEXT NOT NULL,   -- JSON document
    updated_at  TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
