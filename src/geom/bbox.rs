//! Axis-aligned bounding boxes in pixel space.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected box coordinates.
///
/// Raised when a box is misordered (`x1 > x2` or `y1 > y2`) or carries a
/// non-finite coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("invalid bounding box [{x1}, {y1}, {x2}, {y2}] (expected finite x1 <= x2, y1 <= y2)")]
pub struct InvalidBoxError {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// An axis-aligned bounding box in XYXY format, origin at the top-left pixel.
///
/// Unlike a raw coordinate tuple, a `BoundingBox` can only be built through
/// [`BoundingBox::new`], which guarantees finite coordinates with
/// `x1 <= x2` and `y1 <= y2`. Zero width or height is allowed.
#[derive(Clone, Copy, PartialEq)]
pub struct BoundingBox {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl BoundingBox {
    /// Creates a new bounding box, failing fast on malformed coordinates.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, InvalidBoxError> {
        let finite = x1.is_finite() && y1.is_finite() && x2.is_finite() && y2.is_finite();
        if !finite || x1 > x2 || y1 > y2 {
            return Err(InvalidBoxError { x1, y1, x2, y2 });
        }
        Ok(Self { x1, y1, x2, y2 })
    }

    /// Creates a box from a top-left corner and a size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Result<Self, InvalidBoxError> {
        Self::new(x, y, x + width, y + height)
    }

    #[inline]
    pub fn x1(&self) -> f64 {
        self.x1
    }

    #[inline]
    pub fn y1(&self) -> f64 {
        self.y1
    }

    #[inline]
    pub fn x2(&self) -> f64 {
        self.x2
    }

    #[inline]
    pub fn y2(&self) -> f64 {
        self.y2
    }

    /// Returns the width of the box. Never negative.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Returns the height of the box. Never negative.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns true if the box has zero width or zero height.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.area() <= 0.0
    }

    /// Returns the coordinates as `[x1, y1, x2, y2]`.
    #[inline]
    pub fn to_array(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Returns true if no part of the box falls on a `width` x `height`
    /// image. A box touching the right or bottom edge from outside counts
    /// as outside.
    pub fn is_outside(&self, width: u32, height: u32) -> bool {
        self.x2 < 0.0 || self.y2 < 0.0 || self.x1 >= width as f64 || self.y1 >= height as f64
    }

    /// Area of the overlap with `other`, clamped to zero for disjoint boxes.
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let ix1 = self.x1.max(other.x1);
        let iy1 = self.y1.max(other.y1);
        let ix2 = self.x2.min(other.x2);
        let iy2 = self.y2.min(other.y2);
        (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0)
    }

    /// Intersection over union with `other`, in `[0, 1]`.
    ///
    /// Returns `0.0` when both boxes are degenerate and the union is empty.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let inter = self.intersection_area(other);
        let union = self.area() + other.area() - inter;
        if union <= 0.0 {
            return 0.0;
        }
        (inter / union).clamp(0.0, 1.0)
    }
}

impl std::fmt::Debug for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundingBox")
            .field("x1", &self.x1)
            .field("y1", &self.y1)
            .field("x2", &self.x2)
            .field("y2", &self.y2)
            .finish()
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.1}, {:.1}, {:.1}, {:.1}]",
            self.x1, self.y1, self.x2, self.y2
        )
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = InvalidBoxError;

    fn try_from(value: [f64; 4]) -> Result<Self, Self::Error> {
        let [x1, y1, x2, y2] = value;
        Self::new(x1, y1, x2, y2)
    }
}

// Boxes travel as plain `[x1, y1, x2, y2]` arrays on the wire.
impl Serialize for BoundingBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoundingBox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let coords = <[f64; 4]>::deserialize(deserializer)?;
        BoundingBox::try_from(coords).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        BoundingBox::new(x1, y1, x2, y2).expect("valid box")
    }

    #[test]
    fn test_bbox_dimensions() {
        let b = bbox(10.0, 20.0, 100.0, 80.0);
        assert_eq!(b.width(), 90.0);
        assert_eq!(b.height(), 60.0);
        assert_eq!(b.area(), 5400.0);
        assert!(!b.is_degenerate());
    }

    #[test]
    fn test_bbox_from_xywh() {
        let b = BoundingBox::from_xywh(10.0, 20.0, 90.0, 60.0).unwrap();
        assert_eq!(b.to_array(), [10.0, 20.0, 100.0, 80.0]);
    }

    #[test]
    fn test_misordered_box_is_rejected() {
        let err = BoundingBox::new(100.0, 80.0, 10.0, 20.0).unwrap_err();
        assert_eq!(err.x1, 100.0);
        assert!(BoundingBox::new(0.0, 10.0, 5.0, 9.0).is_err());
    }

    #[test]
    fn test_non_finite_box_is_rejected() {
        assert!(BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_is_outside() {
        assert!(!bbox(10.0, 10.0, 20.0, 20.0).is_outside(50, 50));
        assert!(!bbox(-30.0, -30.0, 0.0, 0.0).is_outside(50, 50));
        assert!(!bbox(-1000.0, 10.0, 5.0, 20.0).is_outside(50, 50));
        assert!(bbox(-30.0, 10.0, -0.5, 20.0).is_outside(50, 50));
        assert!(bbox(50.0, 10.0, 60.0, 20.0).is_outside(50, 50));
        assert!(bbox(10.0, 50.0, 20.0, 60.0).is_outside(50, 50));
        assert!(bbox(0.0, 0.0, 1.0, 1.0).is_outside(0, 0));
    }

    #[test]
    fn test_degenerate_box_is_valid() {
        let line = bbox(5.0, 5.0, 5.0, 20.0);
        assert!(line.is_degenerate());
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_iou_identical_boxes() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_partial_overlap() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(5.0, 5.0, 15.0, 15.0);
        // 25 / (100 + 100 - 25)
        assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-12);
    }

    #[test]
    fn test_iou_nested_boxes() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(1.0, 1.0, 9.0, 9.0);
        assert!((a.iou(&b) - 0.64).abs() < 1e-12);
    }

    #[test]
    fn test_iou_disjoint_boxes_is_zero() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(100.0, 100.0, 110.0, 110.0);
        assert_eq!(a.intersection_area(&b), 0.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_touching_edges_is_zero() {
        let a = bbox(0.0, 0.0, 10.0, 10.0);
        let b = bbox(10.0, 0.0, 20.0, 10.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_degenerate_boxes_is_zero() {
        let a = bbox(3.0, 3.0, 3.0, 3.0);
        let b = bbox(3.0, 3.0, 3.0, 3.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_serde_array_form() {
        let b = bbox(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let err = serde_json::from_str::<BoundingBox>("[3.0,2.0,1.0,4.0]").unwrap_err();
        assert!(err.to_string().contains("invalid bounding box"));
    }
}
