//! Validation of raw detection files.
//!
//! Ingestion fails fast on the first bad record. This module is the lenient
//! counterpart: it inspects every record and reports all issues, so a model
//! wrapper's output can be diagnosed in one pass.
//! - Box validity (finite, ordered, positive area, within image bounds)
//! - Score range
//! - Label presence

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use crate::detection::DetectionRecord;

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// Image size `(width, height)` to check boxes against, when known.
    pub image_size: Option<(u32, u32)>,
}

/// Tolerance in pixels for out-of-bounds checks.
const OOB_TOLERANCE_PX: f64 = 0.5;

/// Validates detection records and returns a report of all issues found.
pub fn validate_records(records: &[DetectionRecord], opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    for (index, record) in records.iter().enumerate() {
        validate_label(record, index, &mut report);
        validate_score(record, index, &mut report);
        validate_box(record, index, opts, &mut report);
    }

    report
}

fn validate_label(record: &DetectionRecord, index: usize, report: &mut ValidationReport) {
    if record.label.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::EmptyLabel,
            "Empty class label",
            IssueContext::Detection { index },
        ));
    }
}

fn validate_score(record: &DetectionRecord, index: usize, report: &mut ValidationReport) {
    if !(0.0..=1.0).contains(&record.score) {
        report.add(ValidationIssue::error(
            IssueCode::ScoreOutOfRange,
            format!("Confidence score {} is outside [0, 1]", record.score),
            IssueContext::Detection { index },
        ));
    }
}

fn validate_box(
    record: &DetectionRecord,
    index: usize,
    opts: &ValidateOptions,
    report: &mut ValidationReport,
) {
    let [x1, y1, x2, y2] = record.bbox;

    if !record.bbox.iter().all(|c| c.is_finite()) {
        report.add(ValidationIssue::error(
            IssueCode::BoxNotFinite,
            format!("Non-finite coordinates ({}, {}, {}, {})", x1, y1, x2, y2),
            IssueContext::Detection { index },
        ));
        return;
    }

    if x1 > x2 || y1 > y2 {
        report.add(ValidationIssue::error(
            IssueCode::InvalidBoxOrdering,
            format!(
                "Invalid ordering: ({}, {}) should be <= ({}, {})",
                x1, y1, x2, y2
            ),
            IssueContext::Detection { index },
        ));
    } else if (x2 - x1) * (y2 - y1) <= 0.0 {
        // Degenerate boxes are legal, they just never suppress or fill.
        report.add(ValidationIssue::warning(
            IssueCode::DegenerateBox,
            format!("Zero-area box ({}, {}, {}, {})", x1, y1, x2, y2),
            IssueContext::Detection { index },
        ));
    }

    if let Some((width, height)) = opts.image_size {
        let (w, h) = (width as f64, height as f64);

        if x1 < -OOB_TOLERANCE_PX
            || y1 < -OOB_TOLERANCE_PX
            || x2 > w + OOB_TOLERANCE_PX
            || y2 > h + OOB_TOLERANCE_PX
        {
            report.add(ValidationIssue::warning(
                IssueCode::BoxOutOfBounds,
                format!(
                    "Box ({:.1}, {:.1}, {:.1}, {:.1}) extends outside image bounds (0, 0, {}, {})",
                    x1, y1, x2, y2, width, height
                ),
                IssueContext::Detection { index },
            ));
        }
    }
}
