//! Handler for `POST /import`.
//!
//! The request body is the raw file text. `?format=json|csv|table` selects
//! the parser; without it the format is guessed from the content. Rows are
//! created one at a time, so a write failure part-way leaves the earlier
//! rows in place and is reported with the count so far.

use axum::{
  Json,
  extract::{Query, State},
};
use idverify_core::{record::RecordId, store::RecordStore, verify::Advisor};
use idverify_import::{ImportFormat, detect_format, import};
use serde::{Deserialize, Serialize};

use crate::{AppState, Backend, auth::AdminSession, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ImportParams {
  pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResult {
  pub accepted:         usize,
  pub defaulted_fields: usize,
  pub ids:              Vec<RecordId>,
}

/// `POST /import[?format=<json|csv|table>]`
pub async fn handler<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Query(params): Query<ImportParams>,
  body: String,
) -> Result<Json<ImportResult>, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let format = match params.format {
    Some(name) => name.parse::<ImportFormat>()?,
    None => detect_format(&body),
  };
  let report = import(&body, format)?;

  let mut ids = Vec::with_capacity(report.accepted);
  for record in report.records {
    let id = state.store.create(record).await.map_err(|e| {
      tracing::warn!(created = ids.len(), "import stopped by a write failure");
      ApiError::store(e)
    })?;
    ids.push(id);
  }

  tracing::info!(
    ?format,
    accepted = ids.len(),
    defaulted_fields = report.defaulted_fields,
    "import finished"
  );
  Ok(Json(ImportResult {
    accepted: ids.len(),
    defaulted_fields: report.defaulted_fields,
    ids,
  }))
}
