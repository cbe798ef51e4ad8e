//! Confidence filtering and category assignment.
//!
//! The pipeline filters by confidence *before* suppression, so a box below
//! the threshold never gets to suppress anything, and categorizes last.

use crate::detection::{Category, CategoryTable, Detection, RawDetection, Scored};

/// Keeps detections with `score >= threshold`, in input order.
pub fn filter_by_confidence<T: Scored + Clone>(detections: &[T], threshold: f64) -> Vec<T> {
    detections
        .iter()
        .filter(|d| d.score() >= threshold)
        .cloned()
        .collect()
}

/// Looks up the category for a single detection's label.
pub fn assign_category(detection: &RawDetection, table: &CategoryTable) -> Category {
    table.category_of(detection.label())
}

/// Tags every detection with its category, preserving order.
pub fn assign_categories(detections: &[RawDetection], table: &CategoryTable) -> Vec<Detection> {
    detections
        .iter()
        .map(|d| d.clone().categorize(assign_category(d, table)))
        .collect()
}
