//! Greedy non-maximum suppression.
//!
//! Suppression is class-agnostic: a confident "car" box suppresses an
//! overlapping "truck" box just as it would another "car". Callers that
//! need per-class suppression must partition by label themselves.

use std::cmp::Ordering;

use crate::detection::Scored;
use crate::geom::iou;

/// Suppresses overlapping detections, keeping the most confident of each cluster.
///
/// Detections are ordered by descending score with ties kept in input order
/// (stable sort). The top remaining detection is emitted and every other
/// remaining detection whose IoU with it is `>= iou_threshold` is dropped,
/// until none remain. The output is in emission order, so scores never
/// increase along it.
pub fn nms<T: Scored + Clone>(detections: &[T], iou_threshold: f64) -> Vec<T> {
    let mut order: Vec<usize> = (0..detections.len()).collect();
    order.sort_by(|&a, &b| {
        detections[b]
            .score()
            .partial_cmp(&detections[a].score())
            .unwrap_or(Ordering::Equal)
    });

    let mut suppressed = vec![false; order.len()];
    let mut keep = Vec::new();

    for (rank, &idx) in order.iter().enumerate() {
        if suppressed[rank] {
            continue;
        }

        let best = &detections[idx];
        keep.push(best.clone());

        for (later, &other) in order.iter().enumerate().skip(rank + 1) {
            if !suppressed[later] && iou(best.bbox(), detections[other].bbox()) >= iou_threshold {
                suppressed[later] = true;
            }
        }
    }

    keep
}
