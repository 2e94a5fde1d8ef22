//! QR module matrices and their SVG rendering.

use qrcode::{Color, EcLevel, QrCode, render::svg};

use crate::{Error, Result};

/// Edge length, in pixels, of the on-screen SVG.
pub const DEFAULT_SVG_SIZE: u32 = 200;

/// Light modules around the symbol, per the QR standard.
pub const QUIET_ZONE: usize = 4;

/// An encoded QR symbol (error correction level M, no quiet zone).
#[derive(Clone)]
pub struct QrMatrix {
  code: QrCode,
}

impl std::fmt::Debug for QrMatrix {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QrMatrix").field("width", &self.code.width()).finish_non_exhaustive()
  }
}

impl QrMatrix {
  /// Modules per side.
  pub fn width(&self) -> usize { self.code.width() }

  pub fn is_dark(&self, x: usize, y: usize) -> bool {
    self.code[(x, y)] == Color::Dark
  }

  /// Black-on-white SVG of at least `size`×`size` pixels, quiet zone
  /// included.
  pub fn to_svg(&self, size: u32) -> String {
    self
      .code
      .render::<svg::Color>()
      .min_dimensions(size, size)
      .quiet_zone(true)
      .dark_color(svg::Color("#000000"))
      .light_color(svg::Color("#ffffff"))
      .build()
  }
}

/// Encode `url` into a scannable symbol.
pub fn render(url: &str) -> Result<QrMatrix> {
  let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)
    .map_err(|e| Error::Encode(e.to_string()))?;
  Ok(QrMatrix { code })
}

/// Shorthand for [`render`] followed by [`QrMatrix::to_svg`].
pub fn render_svg(url: &str, size: u32) -> Result<String> {
  Ok(render(url)?.to_svg(size))
}
