//! Remote advisory judge and profile summariser backed by the Gemini
//! `generateContent` REST API.
//!
//! [`GeminiAdvisor`] implements [`idverify_core::verify::Advisor`]. Failures
//! are returned as errors from `judge` (the resolver turns them into the
//! offline fallback) and swallowed by `summarize`, which falls back to the
//! fixed local sentence.

mod client;
mod prompt;

pub mod error;

pub use client::{DEFAULT_ENDPOINT, DEFAULT_MODEL, GeminiAdvisor, GeminiConfig};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
