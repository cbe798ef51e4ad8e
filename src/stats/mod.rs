//! Detection statistics.
//!
//! This module counts a detection set by category and by class label.

mod report;

pub use report::{DetectionSummary, Statistics};

use crate::detection::Detection;

/// Compute counts for a detection set in a single pass.
///
/// `total` always equals `detections.len()`, and both maps sum to it.
pub fn aggregate(detections: &[Detection]) -> Statistics {
    let mut stats = Statistics {
        total: detections.len(),
        ..Default::default()
    };

    for det in detections {
        *stats.by_category.entry(det.category).or_insert(0) += 1;
        *stats.by_class.entry(det.label().to_string()).or_insert(0) += 1;
    }

    stats
}
