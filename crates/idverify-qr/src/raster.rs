//! Downloadable bitmap of a QR symbol.

use image::{ImageBuffer, Rgb, RgbImage, codecs::jpeg::JpegEncoder};

use crate::{Error, QUIET_ZONE, QrMatrix, Result};

/// Edge length, in pixels, of the downloaded JPEG.
pub const DEFAULT_DOWNLOAD_SIZE: u32 = 1024;

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);

/// Scale `matrix` (plus quiet zone) onto an opaque white `size`×`size`
/// canvas and encode it as JPEG.
pub fn rasterize(matrix: &QrMatrix, size: u32, quality: u8) -> Result<Vec<u8>> {
  if size == 0 {
    return Err(Error::InvalidSize(size));
  }

  let width = matrix.width();
  let span = width + 2 * QUIET_ZONE;
  let module_at = |px: u32| px as usize * span / size as usize;

  let img: RgbImage = ImageBuffer::from_fn(size, size, |x, y| {
    let (mx, my) = (module_at(x), module_at(y));
    let inside = (QUIET_ZONE..QUIET_ZONE + width).contains(&mx)
      && (QUIET_ZONE..QUIET_ZONE + width).contains(&my);
    if inside && matrix.is_dark(mx - QUIET_ZONE, my - QUIET_ZONE) {
      DARK
    } else {
      LIGHT
    }
  });

  let mut out = Vec::new();
  JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
    .encode_image(&img)?;
  Ok(out)
}

/// `<name>_QR.jpg`, with each whitespace run in `name` replaced by `_`.
///
/// Path separators and quotes are replaced too so the result is safe in a
/// `Content-Disposition` header.
pub fn download_filename(name: &str) -> String {
  let mut stem = String::with_capacity(name.len());
  let mut in_space = false;
  for c in name.chars() {
    if c.is_whitespace() {
      if !in_space {
        stem.push('_');
      }
      in_space = true;
      continue;
    }
    in_space = false;
    stem.push(if matches!(c, '/' | '\\' | '"') { '_' } else { c });
  }
  format!("{stem}_QR.jpg")
}
