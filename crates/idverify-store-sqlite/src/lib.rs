//! SQLite backend for the IDVerify record store.
//!
//! The store mirrors a browser key-value slot: one row per named slot, the
//! whole record collection serialised as a single JSON document. Access runs
//! through [`tokio_rusqlite`] so the async runtime never blocks on disk.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
