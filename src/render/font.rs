//! Label font loading and text metrics.

use std::path::Path;

use ab_glyph::FontArc;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use crate::error::DetpipeError;

const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// The font used for box labels and grid captions.
///
/// Cheap to clone; the glyph data is shared.
#[derive(Clone)]
pub struct LabelFont {
    font: FontArc,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont").finish_non_exhaustive()
    }
}

impl LabelFont {
    /// The DejaVu Sans font bundled with detpipe.
    pub fn embedded() -> Result<Self, DetpipeError> {
        FontArc::try_from_slice(EMBEDDED_FONT)
            .map(|font| Self { font })
            .map_err(|e| DetpipeError::FontLoad(format!("embedded font: {e}")))
    }

    /// Loads a TrueType/OpenType font from disk.
    pub fn from_path(path: &Path) -> Result<Self, DetpipeError> {
        let bytes = std::fs::read(path)?;
        FontArc::try_from_vec(bytes)
            .map(|font| Self { font })
            .map_err(|e| DetpipeError::FontLoad(format!("{}: {e}", path.display())))
    }

    /// Pixel extents `(width, height)` of `text` at `scale` px.
    pub fn text_size(&self, scale: f32, text: &str) -> (u32, u32) {
        text_size(scale, &self.font, text)
    }

    /// Draws `text` with its top-left corner at `(x, y)`, clipped to the image.
    pub fn draw(&self, image: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: f32, text: &str) {
        draw_text_mut(image, color, x, y, scale, &self.font, text);
    }
}
