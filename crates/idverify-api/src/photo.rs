//! Card photos: upload normalisation, serving, and the generated placeholder.

use std::io::Cursor;

use axum::{
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use idverify_core::{
  record::IdentityRecord,
  store::RecordStore,
  verify::Advisor,
};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType};
use sha2::{Digest, Sha256};

use crate::{AppState, Backend, error::ApiError, records::parse_id};

/// Uploaded photos wider than this are scaled down.
pub const MAX_PHOTO_WIDTH: u32 = 600;
pub const PHOTO_JPEG_QUALITY: u8 = 80;

/// Split a `data:<mime>;base64,<payload>` URL into mime type and bytes.
pub fn decode_data_url(url: &str) -> Option<(&str, Vec<u8>)> {
  let rest = url.strip_prefix("data:")?;
  let (header, payload) = rest.split_once(',')?;
  let mime = header.strip_suffix(";base64")?;
  let bytes = B64.decode(payload.trim()).ok()?;
  Some((mime, bytes))
}

/// Re-encode an uploaded photo as a JPEG data URL no wider than
/// [`MAX_PHOTO_WIDTH`]. An empty input means "no photo".
pub fn normalize_photo(data_url: &str) -> Result<Option<String>, ApiError> {
  if data_url.trim().is_empty() {
    return Ok(None);
  }
  let (_, bytes) = decode_data_url(data_url).ok_or_else(|| {
    ApiError::BadRequest("photo must be a base64 image data URL".to_owned())
  })?;

  let img = image::load_from_memory(&bytes)
    .map_err(|e| ApiError::BadRequest(format!("unreadable photo: {e}")))?;
  let img = if img.width() > MAX_PHOTO_WIDTH {
    img.resize(MAX_PHOTO_WIDTH, u32::MAX, FilterType::Triangle)
  } else {
    img
  };

  let mut out = Vec::new();
  JpegEncoder::new_with_quality(Cursor::new(&mut out), PHOTO_JPEG_QUALITY)
    .encode_image(&img.to_rgb8())
    .map_err(|e| ApiError::Internal(format!("jpeg encoding failed: {e}")))?;

  Ok(Some(format!("data:image/jpeg;base64,{}", B64.encode(out))))
}

/// Avatar shown when a record has no photo: initials on a background whose
/// colour is derived from the name, so the same name always looks the same.
pub fn placeholder_svg(record: &IdentityRecord) -> String {
  let digest = Sha256::digest(record.name.as_bytes());
  let colour = hex::encode(&digest[..3]);
  let initials = html_escape::encode_text(&record.initials()).into_owned();
  format!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="200" viewBox="0 0 200 200"><rect width="200" height="200" fill="#{colour}"/><text x="50%" y="50%" dy=".35em" text-anchor="middle" font-family="sans-serif" font-size="80" fill="#ffffff">{initials}</text></svg>"##
  )
}

/// `GET /records/{id}/photo`: public; the stored image or the placeholder.
pub async fn handler<S, A>(
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let id = parse_id(id)?;
  let record = state
    .store
    .get_by_id(id.clone())
    .await
    .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))?;

  if let Some((mime, bytes)) = record.photo.as_deref().and_then(decode_data_url) {
    return Ok(([(header::CONTENT_TYPE, mime.to_owned())], bytes).into_response());
  }
  Ok(
    ([(header::CONTENT_TYPE, "image/svg+xml")], placeholder_svg(&record))
      .into_response(),
  )
}
