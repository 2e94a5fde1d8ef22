//! Handlers for the QR endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/records/{id}/qr.svg` | On-screen code |
//! | `GET`  | `/records/{id}/qr.jpg` | Download, `<name>_QR.jpg` |
//!
//! Neither requires the record to exist: a code for a deleted record still
//! renders and resolves to "not found" when scanned.

use axum::{
  extract::{Path, State},
  http::header,
  response::{IntoResponse, Response},
};
use idverify_core::{store::RecordStore, verify::Advisor};
use idverify_qr::{
  DEFAULT_SVG_SIZE, download_filename, encode_url, rasterize, render, render_svg,
};

use crate::{AppState, Backend, auth::AdminSession, error::ApiError, records::parse_id};

/// `GET /records/{id}/qr.svg`
pub async fn svg<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let id = parse_id(id)?;
  let url = encode_url(&state.config.base_url, &id);
  let svg = render_svg(&url, DEFAULT_SVG_SIZE)?;
  Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

/// `GET /records/{id}/qr.jpg`
pub async fn jpeg<S, A>(
  _session: AdminSession,
  State(state): State<AppState<S, A>>,
  Path(id): Path<String>,
) -> Result<Response, ApiError>
where
  S: Backend,
  A: Advisor + 'static,
{
  let id = parse_id(id)?;
  let url = encode_url(&state.config.base_url, &id);
  let bytes = rasterize(
    &render(&url)?,
    state.config.qr_download_size,
    state.config.jpeg_quality,
  )?;

  let name = match state.store.get_by_id(id.clone()).await {
    Some(record) => record.name,
    None => id.to_string(),
  };
  let disposition = content_disposition(&download_filename(&name));

  Ok(
    (
      [
        (header::CONTENT_TYPE, "image/jpeg".to_owned()),
        (header::CONTENT_DISPOSITION, disposition),
      ],
      bytes,
    )
      .into_response(),
  )
}

/// `attachment` with an ASCII fallback plus the RFC 5987 UTF-8 form.
fn content_disposition(filename: &str) -> String {
  let ascii: String = filename
    .chars()
    .map(|c| if c.is_ascii_graphic() && c != '"' { c } else { '_' })
    .collect();
  let encoded: String = filename
    .bytes()
    .map(|b| {
      if b.is_ascii_alphanumeric() || b"-._~".contains(&b) {
        (b as char).to_string()
      } else {
        format!("%{b:02X}")
      }
    })
    .collect();
  format!("attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn disposition_for_plain_names() {
    assert_eq!(
      content_disposition("Alice_Johnson_QR.jpg"),
      "attachment; filename=\"Alice_Johnson_QR.jpg\"; filename*=UTF-8''Alice_Johnson_QR.jpg"
    );
  }

  #[test]
  fn disposition_for_unicode_names() {
    let value = content_disposition("José_QR.jpg");
    assert!(value.contains("filename=\"Jos__QR.jpg\""), "{value}");
    assert!(value.contains("filename*=UTF-8''Jos%C3%A9_QR.jpg"), "{value}");
  }
}
