//! End-to-end post-processing.
//!
//! A [`Pipeline`] runs the stages in a fixed order:
//!
//! 1. confidence filter
//! 2. non-maximum suppression over the survivors
//! 3. category assignment
//! 4. statistics
//! 5. rendering
//!
//! It holds only immutable lookup data, so a single instance can be shared
//! across threads and called any number of times.

use std::sync::Arc;

use image::RgbImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify;
use crate::detection::{CategoryTable, Detection, RawDetection};
use crate::error::DetpipeError;
use crate::nms;
use crate::render::{AnnotatedImage, LabelFont, RenderOptions, Renderer};
use crate::stats::{self, Statistics};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.7;
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Thresholds and render options for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineParams {
    /// Minimum score a detection needs to survive filtering.
    pub confidence_threshold: f64,
    /// IoU at or above which a lower-scored box is suppressed.
    pub iou_threshold: f64,
    pub render: RenderOptions,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            render: RenderOptions::default(),
        }
    }
}

impl PipelineParams {
    /// Rejects thresholds outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), DetpipeError> {
        check_threshold("confidence", self.confidence_threshold)?;
        check_threshold("iou", self.iou_threshold)
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), DetpipeError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(DetpipeError::InvalidThreshold { name, value })
    }
}

/// Everything a run produces.
///
/// Serializes to `{"detections": [...], "statistics": {...}}`; the images
/// are written separately.
#[derive(Clone, Debug, Serialize)]
pub struct PipelineResult {
    pub detections: Vec<Detection>,
    pub statistics: Statistics,
    #[serde(skip)]
    pub annotated_image: AnnotatedImage,
}

/// One independent input for [`Pipeline::run_batch`].
#[derive(Clone, Debug)]
pub struct PipelineRequest {
    pub detections: Vec<RawDetection>,
    pub image: RgbImage,
}

#[derive(Clone, Debug)]
pub struct Pipeline {
    table: Arc<CategoryTable>,
    renderer: Renderer,
}

impl Pipeline {
    pub fn new(table: CategoryTable, font: LabelFont) -> Self {
        let table = Arc::new(table);
        let renderer = Renderer::new(font, Arc::clone(&table));
        Self { table, renderer }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Runs every stage over `raw` and renders the survivors onto a copy of
    /// `image`.
    ///
    /// Neither input is modified, so repeated calls with the same arguments
    /// give identical results.
    pub fn run(
        &self,
        raw: &[RawDetection],
        image: &RgbImage,
        confidence_threshold: f64,
        iou_threshold: f64,
        render_options: &RenderOptions,
    ) -> PipelineResult {
        let confident = classify::filter_by_confidence(raw, confidence_threshold);
        debug!(
            input = raw.len(),
            kept = confident.len(),
            confidence_threshold,
            "confidence filter"
        );

        let kept = nms::nms(&confident, iou_threshold);
        debug!(
            input = confident.len(),
            kept = kept.len(),
            iou_threshold,
            "non-maximum suppression"
        );

        let detections = classify::assign_categories(&kept, &self.table);
        let statistics = stats::aggregate(&detections);
        debug!(total = statistics.total, "statistics");

        let annotated_image = self.renderer.draw(image, &detections, render_options);
        debug!(
            width = image.width(),
            height = image.height(),
            "rendered annotations"
        );

        PipelineResult {
            detections,
            statistics,
            annotated_image,
        }
    }

    /// [`Pipeline::run`] with bundled parameters.
    pub fn run_with(
        &self,
        raw: &[RawDetection],
        image: &RgbImage,
        params: &PipelineParams,
    ) -> PipelineResult {
        self.run(
            raw,
            image,
            params.confidence_threshold,
            params.iou_threshold,
            &params.render,
        )
    }

    /// Runs independent requests in parallel. Results come back in request
    /// order.
    pub fn run_batch(
        &self,
        requests: &[PipelineRequest],
        params: &PipelineParams,
    ) -> Vec<PipelineResult> {
        debug!(requests = requests.len(), "batch run");
        requests
            .par_iter()
            .map(|req| self.run_with(&req.detections, &req.image, params))
            .collect()
    }
}
