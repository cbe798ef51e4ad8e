#![allow(dead_code)]

use detpipe::{BoundingBox, RawDetection};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub const LABELS: &[&str] = &["car", "truck", "person", "dog", "stop sign", "kite"];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Boxes inside a `width x height` frame, degenerate ones included.
pub fn arb_bbox_within(width: f64, height: f64) -> BoxedStrategy<BoundingBox> {
    (0.0..=width, 0.0..=width, 0.0..=height, 0.0..=height)
        .prop_map(|(xa, xb, ya, yb)| {
            BoundingBox::new(xa.min(xb), ya.min(yb), xa.max(xb), ya.max(yb))
                .expect("ordered finite box")
        })
        .boxed()
}

/// Boxes with positive width and height.
pub fn arb_nondegenerate_bbox() -> BoxedStrategy<BoundingBox> {
    (-500.0..500.0f64, -500.0..500.0f64, 0.5..300.0f64, 0.5..300.0f64)
        .prop_map(|(x, y, w, h)| BoundingBox::from_xywh(x, y, w, h).expect("finite box"))
        .boxed()
}

pub fn arb_bbox() -> BoxedStrategy<BoundingBox> {
    arb_bbox_within(640.0, 480.0)
}

pub fn arb_label() -> BoxedStrategy<String> {
    prop::sample::select(LABELS)
        .prop_map(|label| label.to_string())
        .boxed()
}

pub fn arb_raw_detection() -> BoxedStrategy<RawDetection> {
    (arb_bbox(), 0.0..=1.0f64, arb_label())
        .prop_map(|(bbox, score, label)| {
            RawDetection::new(bbox, score, label).expect("valid detection")
        })
        .boxed()
}

pub fn arb_raw_detections(max: usize) -> BoxedStrategy<Vec<RawDetection>> {
    proptest::collection::vec(arb_raw_detection(), 0..=max).boxed()
}

/// Detections clustered in a small frame, so suppression actually fires.
pub fn arb_crowded_detections(max: usize) -> BoxedStrategy<Vec<RawDetection>> {
    proptest::collection::vec(
        (arb_bbox_within(60.0, 60.0), 0.0..=1.0f64, arb_label()).prop_map(
            |(bbox, score, label)| RawDetection::new(bbox, score, label).expect("valid detection"),
        ),
        0..=max,
    )
    .boxed()
}
