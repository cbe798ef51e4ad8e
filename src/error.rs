use std::path::PathBuf;
use thiserror::Error;

use crate::detection::InvalidDetectionError;
use crate::validation::ValidationReport;

/// The main error type for detpipe operations.
#[derive(Debug, Error)]
pub enum DetpipeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse detections JSON from {path}: {source}")]
    DetectionsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid detection at index {index}: {source}")]
    InvalidDetection {
        index: usize,
        #[source]
        source: InvalidDetectionError,
    },

    #[error("Failed to write result JSON to {path}: {source}")]
    ResultWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to load font: {0}")]
    FontLoad(String),

    #[error("Invalid {name} threshold {value} (must be within [0, 1])")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}
