//! Box geometry.
//!
//! Every box handled by detpipe is an axis-aligned rectangle in image pixel
//! space, `[x1, y1, x2, y2]` with the origin at the top-left corner. No
//! coordinate-space conversion happens here: boxes are expected to already
//! be expressed in the pixel grid of the image they annotate.

mod bbox;

pub use bbox::{BoundingBox, InvalidBoxError};

/// Intersection over union of two boxes.
///
/// Symmetric, in `[0, 1]`, and `0.0` when the union is empty.
#[inline]
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    a.iou(b)
}
