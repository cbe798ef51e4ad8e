//! Side-by-side comparison grids.

use image::{imageops, Rgb, RgbImage};

use super::{Renderer, BLACK};

const CAPTION_SCALE: f32 = 20.0;
const CAPTION_OFFSET: i32 = 10;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

impl Renderer {
    /// Pastes `images` row-major onto a white canvas.
    ///
    /// Every cell is as large as the largest image. Without an explicit
    /// column count the grid is `ceil(sqrt(n))` columns wide. `titles[i]`,
    /// when present, is captioned in black near the cell's top-left corner.
    pub fn compose_grid(
        &self,
        images: &[RgbImage],
        titles: &[String],
        columns: Option<u32>,
    ) -> RgbImage {
        if images.is_empty() {
            return RgbImage::new(0, 0);
        }

        let n = images.len() as u32;
        let cols = columns
            .filter(|&c| c > 0)
            .unwrap_or_else(|| (n as f64).sqrt().ceil() as u32)
            .min(n);
        let rows = n.div_ceil(cols);

        let cell_w = images.iter().map(|img| img.width()).max().unwrap_or(0);
        let cell_h = images.iter().map(|img| img.height()).max().unwrap_or(0);

        let mut grid = RgbImage::from_pixel(cols * cell_w, rows * cell_h, BACKGROUND);

        for (idx, img) in images.iter().enumerate() {
            let idx = idx as u32;
            let x = (idx % cols) * cell_w;
            let y = (idx / cols) * cell_h;
            imageops::replace(&mut grid, img, x as i64, y as i64);

            if let Some(title) = titles.get(idx as usize) {
                self.font().draw(
                    &mut grid,
                    BLACK,
                    x as i32 + CAPTION_OFFSET,
                    y as i32 + CAPTION_OFFSET,
                    CAPTION_SCALE,
                    title,
                );
            }
        }

        grid
    }
}
