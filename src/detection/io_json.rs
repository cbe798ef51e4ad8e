//! JSON ingestion of raw detections and output of pipeline results.
//!
//! The input format is what a model wrapper emits: either a bare array of
//! records or an object with a `detections` array.
//!
//! ```json
//! [
//!   {"box": [12.0, 40.5, 120.0, 200.0], "score": 0.93, "label": "car", "label_id": 3},
//!   {"box": [300.0, 80.0, 340.0, 190.0], "score": 0.71, "label": "person"}
//! ]
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{DetectionRecord, RawDetection};
use crate::error::DetpipeError;

#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionsDocument {
    List(Vec<DetectionRecord>),
    Wrapped { detections: Vec<DetectionRecord> },
}

impl DetectionsDocument {
    fn into_records(self) -> Vec<DetectionRecord> {
        match self {
            DetectionsDocument::List(records) => records,
            DetectionsDocument::Wrapped { detections } => detections,
        }
    }
}

/// Reads unvalidated detection records from a JSON file.
///
/// Used by validation, which wants to see every issue rather than stop at
/// the first bad record.
pub fn read_detection_records(path: &Path) -> Result<Vec<DetectionRecord>, DetpipeError> {
    let file = File::open(path).map_err(DetpipeError::Io)?;
    let reader = BufReader::new(file);

    let document: DetectionsDocument =
        serde_json::from_reader(reader).map_err(|source| DetpipeError::DetectionsParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(document.into_records())
}

/// Reads and validates raw detections from a JSON file.
///
/// # Errors
/// Fails on unreadable or malformed JSON, and on the first record that
/// violates a detection invariant (misordered box, score outside `[0, 1]`,
/// empty label).
pub fn read_detections(path: &Path) -> Result<Vec<RawDetection>, DetpipeError> {
    into_raw_detections(read_detection_records(path)?)
}

/// Parses unvalidated detection records from a JSON string.
pub fn from_records_str(json: &str) -> Result<Vec<DetectionRecord>, serde_json::Error> {
    serde_json::from_str::<DetectionsDocument>(json).map(DetectionsDocument::into_records)
}

/// Parses unvalidated detection records from a byte slice.
pub fn from_records_slice(bytes: &[u8]) -> Result<Vec<DetectionRecord>, serde_json::Error> {
    serde_json::from_slice::<DetectionsDocument>(bytes).map(DetectionsDocument::into_records)
}

/// Validates records in order, failing fast on the first bad one.
pub fn into_raw_detections(
    records: Vec<DetectionRecord>,
) -> Result<Vec<RawDetection>, DetpipeError> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            RawDetection::try_from(record)
                .map_err(|source| DetpipeError::InvalidDetection { index, source })
        })
        .collect()
}

/// Writes any serializable result as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DetpipeError> {
    let file = File::create(path).map_err(DetpipeError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, value).map_err(|source| DetpipeError::ResultWrite {
        path: path.to_path_buf(),
        source,
    })
}
