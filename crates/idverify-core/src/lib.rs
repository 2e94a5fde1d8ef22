//! Core types and trait definitions for the IDVerify record store.
//!
//! This crate is free of HTTP and database dependencies. Storage backends,
//! the advisory client, and the HTTP layer all depend on it.

// Native `async fn` in traits; the traits spell out `Send` bounds themselves.
#![allow(async_fn_in_trait)]

pub mod credentials;
pub mod error;
pub mod record;
pub mod store;
pub mod verify;

pub use error::{Error, Result};
