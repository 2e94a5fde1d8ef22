//! Handler for `GET /verify/{id}`: public.
//!
//! Always 200: "not found" is a verification outcome, reported in the body's
//! `state`, not an HTTP error.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use idverify_core::verify::{Advisor, Verification};
use serde::Deserialize;

use crate::{AppState, Backend};

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
  /// Set `false` to skip the advisory call and use the date check only.
  #[serde(default = "consult_advisor")]
  pub advisory: bool,
}

fn consult_advisor() -> bool { true }

/// `GET /verify/{id}[?advisory=false]`
pub async fn handler<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
  Query(params): Query<VerifyParams>,
) -> Json<Verification>
where
  S: Backend,
  A: Advisor + 'static,
{
  let today = Utc::now().date_naive();
  Json(state.resolver.resolve_on(&id, today, params.advisory).await)
}
