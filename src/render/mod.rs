//! Box and label rendering.
//!
//! The renderer draws onto a copy of the caller's image, one detection at a
//! time in list order, so later detections paint over earlier ones where
//! they overlap. For each detection it draws:
//!
//! 1. the box outline, `line_thickness` pixels wide and centered on the edge,
//! 2. a 10% tint of the box interior (category coloring only),
//! 3. a solid label background anchored at the box's top-left corner, pushed
//!    down to row 0 when there is no room above the box,
//! 4. the label text in white over a 1px black drop shadow.
//!
//! Coordinates are truncated to whole pixels. Anything outside the image is
//! clipped, and a box lying entirely out of frame draws nothing at all, not
//! even its label. Zero-area boxes get an outline and label but no tint.

mod font;
mod grid;
mod palette;

pub use font::LabelFont;
pub use palette::{resolve_color, ColorPolicy, BLACK, PALETTE, WHITE};

use std::sync::Arc;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::detection::{CategoryTable, Detection, Scored};
use crate::geom::BoundingBox;

/// Weight of the box color in the interior tint.
const FILL_ALPHA: f32 = 0.1;

/// Padding around label text, split evenly on each side.
const LABEL_PADDING: i64 = 10;

/// Rendering switches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub show_labels: bool,
    /// Append the score as a percentage to each label.
    pub show_confidence: bool,
    /// Outline width in pixels. Zero disables outlines.
    pub line_thickness: u32,
    pub color_policy: ColorPolicy,
    /// Label font size in pixels.
    pub font_size: f32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_confidence: true,
            line_thickness: 3,
            color_policy: ColorPolicy::ByCategory,
            font_size: 16.0,
        }
    }
}

/// The untouched input raster next to its annotated copy.
#[derive(Clone, Debug)]
pub struct AnnotatedImage {
    pub original: RgbImage,
    pub annotated: RgbImage,
}

/// Draws detections onto images.
#[derive(Clone, Debug)]
pub struct Renderer {
    font: LabelFont,
    table: Arc<CategoryTable>,
}

impl Renderer {
    pub fn new(font: LabelFont, table: Arc<CategoryTable>) -> Self {
        Self { font, table }
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    /// Renders `detections` onto a copy of `image`.
    pub fn draw(
        &self,
        image: &RgbImage,
        detections: &[Detection],
        options: &RenderOptions,
    ) -> AnnotatedImage {
        let mut canvas = image.clone();

        for (index, det) in detections.iter().enumerate() {
            if det.bbox().is_outside(canvas.width(), canvas.height()) {
                continue;
            }

            let color = resolve_color(options.color_policy, &self.table, det, index);
            let rect = PixelRect::from_bbox(det.bbox(), &canvas, options.line_thickness);

            draw_outline(&mut canvas, rect, color, options.line_thickness);

            if options.color_policy == ColorPolicy::ByCategory && !det.bbox().is_degenerate() {
                blend_fill(&mut canvas, rect, color, FILL_ALPHA);
            }

            if options.show_labels {
                let text = label_text(det, options.show_confidence);
                self.draw_label(&mut canvas, det.bbox(), &text, color, options.font_size);
            }
        }

        AnnotatedImage {
            original: image.clone(),
            annotated: canvas,
        }
    }

    fn draw_label(
        &self,
        canvas: &mut RgbImage,
        bbox: &BoundingBox,
        text: &str,
        color: Rgb<u8>,
        scale: f32,
    ) {
        let (text_w, text_h) = self.font.text_size(scale, text);
        let layout = LabelLayout::new(bbox, text_w, text_h, canvas.width());

        if let Some(background) = to_rect(
            layout.x,
            layout.y,
            text_w as i64 + LABEL_PADDING,
            text_h as i64 + LABEL_PADDING,
        ) {
            draw_filled_rect_mut(canvas, background, color);
        }

        let text_x = clamp_i32(layout.x + LABEL_PADDING / 2);
        let text_y = clamp_i32(layout.y + LABEL_PADDING / 2);
        let (shadow_x, shadow_y) = (text_x.saturating_add(1), text_y.saturating_add(1));
        self.font.draw(canvas, BLACK, shadow_x, shadow_y, scale, text);
        self.font.draw(canvas, WHITE, text_x, text_y, scale, text);
    }
}

/// Label text for a detection: `"car: 93.25%"`, or just `"car"`.
pub fn label_text(detection: &Detection, show_confidence: bool) -> String {
    if show_confidence {
        format!("{}: {:.2}%", detection.label(), detection.score() * 100.0)
    } else {
        detection.label().to_string()
    }
}

/// Top-left corner of a label background.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LabelLayout {
    x: i64,
    y: i64,
}

impl LabelLayout {
    /// Sits directly above the box, or at row 0 when the box is too close
    /// to the top edge.
    ///
    /// `x` follows the box's own left edge, so a box that starts off the
    /// left of the image keeps its label off-screen too. It is held within
    /// one label width of the image to keep text positions small.
    fn new(bbox: &BoundingBox, text_w: u32, text_h: u32, canvas_w: u32) -> Self {
        let band = text_w as i64 + LABEL_PADDING;
        let x = (bbox.x1() as i64).clamp(-band, canvas_w as i64);
        let y = (bbox.y1() as i64)
            .saturating_sub(text_h as i64 + LABEL_PADDING)
            .max(0);
        Self { x, y }
    }
}

/// A box snapped to the pixel grid, inclusive on both ends.
///
/// Coordinates are clamped to a margin just outside the image so that
/// out-of-frame edges stay out of frame while the arithmetic stays small.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PixelRect {
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
}

impl PixelRect {
    fn from_bbox(bbox: &BoundingBox, canvas: &RgbImage, thickness: u32) -> Self {
        let margin = thickness as i64 + 1;
        let clamp_x = |v: f64| (v as i64).clamp(-margin, canvas.width() as i64 + margin);
        let clamp_y = |v: f64| (v as i64).clamp(-margin, canvas.height() as i64 + margin);
        Self {
            x1: clamp_x(bbox.x1()),
            y1: clamp_y(bbox.y1()),
            x2: clamp_x(bbox.x2()),
            y2: clamp_y(bbox.y2()),
        }
    }
}

/// Concentric one-pixel outlines, from `(t - 1) / 2` outside the edge to
/// `t / 2` inside it.
fn draw_outline(canvas: &mut RgbImage, rect: PixelRect, color: Rgb<u8>, thickness: u32) {
    let t = thickness as i64;
    for k in 0..t {
        let inset = k - (t - 1) / 2;
        let outline = to_rect(
            rect.x1 + inset,
            rect.y1 + inset,
            rect.x2 - rect.x1 + 1 - 2 * inset,
            rect.y2 - rect.y1 + 1 - 2 * inset,
        );
        if let Some(outline) = outline {
            draw_hollow_rect_mut(canvas, outline, color);
        }
    }
}

/// Blends `color` over the rectangle: `alpha * color + (1 - alpha) * pixel`.
fn blend_fill(canvas: &mut RgbImage, rect: PixelRect, color: Rgb<u8>, alpha: f32) {
    let x_start = rect.x1.max(0);
    let y_start = rect.y1.max(0);
    let x_end = rect.x2.min(canvas.width() as i64 - 1);
    let y_end = rect.y2.min(canvas.height() as i64 - 1);

    for y in y_start..=y_end {
        for x in x_start..=x_end {
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            for (channel, tint) in pixel.0.iter_mut().zip(color.0) {
                let blended = alpha * tint as f32 + (1.0 - alpha) * *channel as f32;
                *channel = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Builds an imageproc rect, or `None` if it would be empty.
fn to_rect(x: i64, y: i64, width: i64, height: i64) -> Option<Rect> {
    if width <= 0 || height <= 0 {
        return None;
    }
    Some(Rect::at(clamp_i32(x), clamp_i32(y)).of_size(width as u32, height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{Category, RawDetection};

    const GRAY: Rgb<u8> = Rgb([100, 100, 100]);

    fn renderer() -> Renderer {
        Renderer::new(
            LabelFont::embedded().unwrap(),
            Arc::new(CategoryTable::default()),
        )
    }

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, label: &str, category: Category) -> Detection {
        let bbox = BoundingBox::new(x1, y1, x2, y2).unwrap();
        RawDetection::new(bbox, 0.9, label)
            .unwrap()
            .categorize(category)
    }

    fn gray_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, GRAY)
    }

    fn no_labels() -> RenderOptions {
        RenderOptions {
            show_labels: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_label_text() {
        let d = det(0.0, 0.0, 1.0, 1.0, "car", Category::Vehicle);
        assert_eq!(label_text(&d, true), "car: 90.00%");
        assert_eq!(label_text(&d, false), "car");
    }

    #[test]
    fn test_original_is_untouched_and_dims_preserved() {
        let image = gray_image(64, 48);
        let dets = vec![det(10.0, 10.0, 40.0, 30.0, "car", Category::Vehicle)];
        let out = renderer().draw(&image, &dets, &RenderOptions::default());

        assert_eq!(image, gray_image(64, 48));
        assert_eq!(out.original, image);
        assert_eq!(out.annotated.dimensions(), (64, 48));
        assert_ne!(out.annotated, image);
    }

    #[test]
    fn test_outline_and_fill_by_category() {
        let table = CategoryTable::default();
        let color = table.color_of(Category::Vehicle);
        let image = gray_image(100, 100);
        let dets = vec![det(20.0, 30.0, 60.0, 80.0, "car", Category::Vehicle)];
        let out = renderer().draw(&image, &dets, &no_labels());
        let img = &out.annotated;

        // Thickness 3 spans one pixel either side of the edge; the fill then
        // tints the outline pixels inside the box, leaving them at the color.
        assert_eq!(*img.get_pixel(19, 50), color);
        assert_eq!(*img.get_pixel(20, 50), color);
        assert_eq!(*img.get_pixel(21, 50), color);
        assert_eq!(*img.get_pixel(18, 50), GRAY);

        // Interior: round(0.1 * c + 0.9 * 100)
        let expected = Rgb([
            (0.1f32 * 59.0 + 90.0).round() as u8,
            (0.1f32 * 130.0 + 90.0).round() as u8,
            (0.1f32 * 246.0 + 90.0).round() as u8,
        ]);
        assert_eq!(*img.get_pixel(40, 55), expected);

        // Outside the box stays put.
        assert_eq!(*img.get_pixel(80, 90), GRAY);
    }

    #[test]
    fn test_index_policy_has_no_fill() {
        let image = gray_image(100, 100);
        let dets = vec![
            det(10.0, 10.0, 40.0, 40.0, "car", Category::Vehicle),
            det(50.0, 50.0, 90.0, 90.0, "car", Category::Vehicle),
        ];
        let options = RenderOptions {
            color_policy: ColorPolicy::ByIndexCyclic,
            ..no_labels()
        };
        let out = renderer().draw(&image, &dets, &options);

        assert_eq!(*out.annotated.get_pixel(10, 25), PALETTE[0]);
        assert_eq!(*out.annotated.get_pixel(50, 70), PALETTE[1]);
        assert_eq!(*out.annotated.get_pixel(25, 25), GRAY);
    }

    #[test]
    fn test_later_detections_paint_over_earlier() {
        let image = gray_image(100, 100);
        let dets = vec![
            det(10.0, 10.0, 50.0, 50.0, "a", Category::Vehicle),
            det(10.0, 10.0, 50.0, 50.0, "b", Category::Vehicle),
        ];
        let options = RenderOptions {
            color_policy: ColorPolicy::ByIndexCyclic,
            ..no_labels()
        };
        let out = renderer().draw(&image, &dets, &options);
        assert_eq!(*out.annotated.get_pixel(10, 30), PALETTE[1]);
    }

    #[test]
    fn test_label_background_above_box() {
        let r = renderer();
        let table = CategoryTable::default();
        let color = table.color_of(Category::Animal);
        let image = gray_image(200, 200);
        let dets = vec![det(50.0, 100.0, 150.0, 180.0, "dog", Category::Animal)];
        let options = RenderOptions {
            show_confidence: false,
            line_thickness: 1,
            ..Default::default()
        };
        let out = r.draw(&image, &dets, &options);

        let (_, text_h) = r.font().text_size(options.font_size, "dog");
        let top = 100 - text_h as u32 - 10;
        // Left edge of the background is padding, never text.
        assert_eq!(*out.annotated.get_pixel(51, top), color);
        assert_eq!(*out.annotated.get_pixel(51, top + 2), color);
        assert_eq!(*out.annotated.get_pixel(51, top - 1), GRAY);
    }

    #[test]
    fn test_label_background_clamped_to_top_row() {
        let r = renderer();
        let table = CategoryTable::default();
        let color = table.color_of(Category::Pedestrian);
        let image = gray_image(200, 200);
        let dets = vec![det(50.0, 5.0, 150.0, 150.0, "person", Category::Pedestrian)];
        let options = RenderOptions {
            show_confidence: false,
            line_thickness: 1,
            ..Default::default()
        };
        let out = r.draw(&image, &dets, &options);

        assert_eq!(*out.annotated.get_pixel(51, 0), color);
        assert_eq!(*out.annotated.get_pixel(52, 1), color);
    }

    #[test]
    fn test_label_layout() {
        let bbox = |x1, y1| BoundingBox::new(x1, y1, 60.0, 160.0).unwrap();
        let layout = |b: &BoundingBox| LabelLayout::new(b, 40, 12, 200);

        assert_eq!(layout(&bbox(30.7, 100.0)), LabelLayout { x: 30, y: 78 });
        assert_eq!(layout(&bbox(30.0, 15.0)), LabelLayout { x: 30, y: 0 });
        assert_eq!(layout(&bbox(-1000.0, 100.0)), LabelLayout { x: -50, y: 78 });
        assert_eq!(layout(&bbox(-1e300, -1e300)), LabelLayout { x: -50, y: 0 });
    }

    #[test]
    fn test_label_stays_with_box_far_off_left_edge() {
        let image = gray_image(300, 200);
        let dets = vec![det(-1000.0, 80.0, 200.0, 180.0, "car", Category::Vehicle)];
        let options = RenderOptions {
            line_thickness: 1,
            ..Default::default()
        };
        let out = renderer().draw(&image, &dets, &options);

        // The label would sit in the rows above the box, starting at x = -1000.
        for y in 0..80u32 {
            for x in 0..300u32 {
                assert_eq!(*out.annotated.get_pixel(x, y), GRAY, "pixel ({x}, {y})");
            }
        }
        // The visible part of the box is still drawn.
        assert_ne!(*out.annotated.get_pixel(100, 80), GRAY);
    }

    #[test]
    fn test_label_text_has_offset_drop_shadow() {
        let r = renderer();
        let color = CategoryTable::default().color_of(Category::Animal);
        let image = gray_image(200, 200);
        let dets = vec![det(50.0, 100.0, 150.0, 180.0, "dog", Category::Animal)];
        let options = RenderOptions {
            show_confidence: false,
            line_thickness: 0,
            ..Default::default()
        };
        let out = r.draw(&image, &dets, &options);

        let unlabelled = RenderOptions {
            show_labels: false,
            ..options.clone()
        };
        let mut expected = r.draw(&image, &dets, &unlabelled).annotated;
        let scale = options.font_size;
        let (text_w, text_h) = r.font().text_size(scale, "dog");
        let top = 100 - text_h as i32 - 10;
        draw_filled_rect_mut(
            &mut expected,
            Rect::at(50, top).of_size(text_w + 10, text_h + 10),
            color,
        );
        let mut white_only = expected.clone();

        r.font().draw(&mut expected, BLACK, 56, top + 6, scale, "dog");
        r.font().draw(&mut expected, WHITE, 55, top + 5, scale, "dog");
        r.font().draw(&mut white_only, WHITE, 55, top + 5, scale, "dog");

        assert_eq!(out.annotated, expected);
        assert_ne!(out.annotated, white_only);
    }

    #[test]
    fn test_label_text_pixels_are_drawn() {
        let r = renderer();
        let image = gray_image(300, 120);
        let dets = vec![det(20.0, 60.0, 280.0, 110.0, "truck", Category::Vehicle)];
        let out = r.draw(&image, &dets, &RenderOptions::default());

        // Near-white text ends up somewhere above the box.
        let found_white = (0..60u32)
            .flat_map(|y| (20..280u32).map(move |x| (x, y)))
            .any(|(x, y)| out.annotated.get_pixel(x, y).0.iter().all(|&c| c > 200));
        assert!(found_white);
    }

    #[test]
    fn test_out_of_frame_boxes_do_not_panic() {
        let image = gray_image(50, 50);
        let dets = vec![
            det(500.0, 500.0, 600.0, 600.0, "car", Category::Vehicle),
            det(-1e12, -1e12, -5e11, -5e11, "car", Category::Vehicle),
            det(0.0, 0.0, 1e15, 1e15, "car", Category::Vehicle),
        ];
        let out = renderer().draw(&image, &dets[..2], &RenderOptions::default());
        assert_eq!(out.annotated, image);

        let out = renderer().draw(&image, &dets, &RenderOptions::default());
        assert_eq!(out.annotated.dimensions(), (50, 50));
    }

    #[test]
    fn test_degenerate_box_has_no_interior_tint() {
        let image = gray_image(50, 50);
        let dets = vec![det(25.0, 10.0, 25.0, 40.0, "pole", Category::Other)];
        let options = RenderOptions {
            line_thickness: 0,
            ..no_labels()
        };
        let out = renderer().draw(&image, &dets, &options);
        assert_eq!(*out.annotated.get_pixel(24, 20), GRAY);
        assert_eq!(*out.annotated.get_pixel(25, 20), GRAY);
        assert_eq!(*out.annotated.get_pixel(26, 20), GRAY);
    }

    #[test]
    fn test_empty_detections_returns_copy() {
        let image = gray_image(10, 10);
        let out = renderer().draw(&image, &[], &RenderOptions::default());
        assert_eq!(out.annotated, image);
    }
}
