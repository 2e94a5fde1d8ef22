//! QR codec for verification links.
//!
//! Encoding only: an id becomes a verification URL, the URL becomes a module
//! matrix, and the matrix becomes either an SVG for on-screen display or a
//! fixed-size JPEG for download. Nothing here talks to the record store; a
//! code for a deleted record simply resolves to "not found" when scanned.

mod raster;
mod render;
mod url;

pub mod error;

pub use error::{Error, Result};
pub use raster::{
  DEFAULT_DOWNLOAD_SIZE, DEFAULT_JPEG_QUALITY, download_filename, rasterize,
};
pub use render::{DEFAULT_SVG_SIZE, QUIET_ZONE, QrMatrix, render, render_svg};
pub use url::{VERIFY_FRAGMENT, encode_url, extract_id};
