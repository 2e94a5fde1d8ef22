//! Handlers for `/records` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/records` | Optional `?q=` filter |
//! | `POST`   | `/records` | Body: [`NewRecord`]; 201 + record |
//! | `GET`    | `/records/{id}` | 404 if not found |
//! | `PATCH`  | `/records/{id}` | Body: [`RecordPatch`]; 404 if not found |
//! | `DELETE` | `/records/{id}` | 204, idempotent |
//! | `POST`   | `/records/bulk-delete` | Body: `{"ids":[...]}` |
//! | `GET`    | `/records/{id}/summary` | Profile blurb |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use idverify_core::{
  record::{IdentityRecord, NewRecord, RecordId, RecordPatch},
  store::RecordStore,
  verify::{Advisor, local_summary},
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState, Backend, auth::AdminSession, error::ApiError, photo::normalize_photo,
};

pub(crate) fn parse_id(raw: String) -> Result<RecordId, ApiError> {
  RecordId::parse(raw).map_err(ApiError::invalid)
}

async fn fetch<S: Backend>(store: &S, id: RecordId) -> Result<IdentityRecord, ApiError> {
  store
    .get_by_id(id.clone())
    .await
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub q: Option<String>,
}

/// `GET /records[?q=<text>]`
pub async fn list<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Query(params): Query<ListParams>,
) -> Json<Vec<IdentityRecord>>
where
  S: Backend,
  A: Advisor + 'static,
{
  let records = match params.q {
    Some(q) => state.store.search(q).await,
    None => state.store.list().await,
  };
  Json(records)
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /records`
pub async fn create<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Json(mut input): Json<NewRecord>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  if let Some(photo) = input.photo.take() {
    input.photo = normalize_photo(&photo)?;
  }
  input.validate().map_err(ApiError::invalid)?;

  if let Some(id) = &input.id
    && state.store.get_by_id(id.clone()).await.is_some()
  {
    return Err(ApiError::Conflict(format!("record {id} already exists")));
  }

  let id = state.store.create(input).await.map_err(ApiError::store)?;
  let record = fetch(state.store.as_ref(), id).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /records/{id}`
pub async fn get_one<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> Result<Json<IdentityRecord>, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let record = fetch(state.store.as_ref(), parse_id(id)?).await?;
  Ok(Json(record))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PATCH /records/{id}`
pub async fn update<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
  Json(mut patch): Json<RecordPatch>,
) -> Result<Json<IdentityRecord>, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let id = parse_id(id)?;
  if let Some(photo) = patch.photo.take() {
    // An empty string clears the photo.
    patch.photo = Some(normalize_photo(&photo)?.unwrap_or_default());
  }
  patch.validate().map_err(ApiError::invalid)?;

  let updated = state
    .store
    .update(id.clone(), patch)
    .await
    .map_err(ApiError::store)?;
  if !updated {
    return Err(ApiError::NotFound(format!("record {id} not found")));
  }
  let record = fetch(state.store.as_ref(), id).await?;
  Ok(Json(record))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /records/{id}`: 204 whether or not the record existed.
pub async fn delete_one<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  state
    .store
    .delete(parse_id(id)?)
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
  pub ids: Vec<RecordId>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResult {
  pub deleted: usize,
}

/// `POST /records/bulk-delete` with body `{"ids":["a","b"]}`
pub async fn bulk_delete<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Json(body): Json<BulkDeleteBody>,
) -> Result<Json<BulkDeleteResult>, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let mut deleted = 0;
  for id in body.ids {
    if state.store.delete(id).await.map_err(ApiError::store)? {
      deleted += 1;
    }
  }
  tracing::info!(deleted, "bulk delete");
  Ok(Json(BulkDeleteResult { deleted }))
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SummaryBody {
  pub summary: String,
}

/// `GET /records/{id}/summary`: advisor text, or the local sentence when no
/// advisor is configured.
pub async fn summary<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> Result<Json<SummaryBody>, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let record = fetch(state.store.as_ref(), parse_id(id)?).await?;
  let summary = match state.resolver.advisor() {
    Some(advisor) => advisor.summarize(&record).await,
    None => local_summary(&record),
  };
  Ok(Json(SummaryBody { summary }))
}
