//! Remote document-store backend for the IDVerify record store.
//!
//! Every record is one JSON document in the `employees` collection; the admin
//! credentials are the singleton document `settings/admin`. The wire protocol
//! is plain REST:
//!
//! ```text
//! GET    {endpoint}/collections/{collection}/documents        → {"documents": [...]}
//! GET    {endpoint}/collections/{collection}/documents/{id}   → document | 404
//! PUT    {endpoint}/collections/{collection}/documents/{id}   ← document
//! DELETE {endpoint}/collections/{collection}/documents/{id}   → 2xx | 404
//! ```

mod document;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{RemoteConfig, RemoteStore};
