//! Typed detection values.
//!
//! A [`RawDetection`] is what the detection model hands over: a box, a score
//! and a class label. Once categorized it becomes a [`Detection`]. Both are
//! value objects; every pipeline stage produces fresh ones.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::Category;
use crate::geom::{BoundingBox, InvalidBoxError};

/// Why a raw record could not become a detection.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InvalidDetectionError {
    #[error(transparent)]
    Box(#[from] InvalidBoxError),

    #[error("confidence score {0} is outside [0, 1]")]
    ScoreOutOfRange(f64),

    #[error("class label is empty")]
    EmptyLabel,
}

/// Anything carrying a box and a confidence score.
///
/// Confidence filtering and suppression are generic over this, so they run
/// on both raw and categorized detections.
pub trait Scored {
    fn bbox(&self) -> &BoundingBox;
    fn score(&self) -> f64;
}

/// The wire form of a detection, as produced by a model wrapper.
///
/// Deserialization is lenient: nothing is checked. Use
/// [`RawDetection::try_from`] (or deserialize a `RawDetection` directly) to
/// enforce the invariants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
    pub score: f64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_id: Option<u32>,
}

/// A validated, uncategorized detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DetectionRecord", into = "DetectionRecord")]
pub struct RawDetection {
    bbox: BoundingBox,
    score: f64,
    label: String,
    label_id: Option<u32>,
}

impl RawDetection {
    /// Creates a detection, rejecting scores outside `[0, 1]` and empty labels.
    pub fn new(
        bbox: BoundingBox,
        score: f64,
        label: impl Into<String>,
    ) -> Result<Self, InvalidDetectionError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(InvalidDetectionError::ScoreOutOfRange(score));
        }
        let label = label.into();
        if label.is_empty() {
            return Err(InvalidDetectionError::EmptyLabel);
        }
        Ok(Self {
            bbox,
            score,
            label,
            label_id: None,
        })
    }

    /// Attaches the model's numeric class id.
    pub fn with_label_id(mut self, label_id: u32) -> Self {
        self.label_id = Some(label_id);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn label_id(&self) -> Option<u32> {
        self.label_id
    }

    /// Tags this detection with its category.
    pub fn categorize(self, category: Category) -> Detection {
        Detection {
            raw: self,
            category,
        }
    }
}

impl Scored for RawDetection {
    fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    fn score(&self) -> f64 {
        self.score
    }
}

impl TryFrom<DetectionRecord> for RawDetection {
    type Error = InvalidDetectionError;

    fn try_from(record: DetectionRecord) -> Result<Self, Self::Error> {
        let bbox = BoundingBox::try_from(record.bbox)?;
        let detection = RawDetection::new(bbox, record.score, record.label)?;
        Ok(match record.label_id {
            Some(id) => detection.with_label_id(id),
            None => detection,
        })
    }
}

impl From<RawDetection> for DetectionRecord {
    fn from(d: RawDetection) -> Self {
        Self {
            bbox: d.bbox.to_array(),
            score: d.score,
            label: d.label,
            label_id: d.label_id,
        }
    }
}

/// A detection with its category tag.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Detection {
    #[serde(flatten)]
    raw: RawDetection,
    pub category: Category,
}

impl Detection {
    pub fn label(&self) -> &str {
        self.raw.label()
    }

    pub fn label_id(&self) -> Option<u32> {
        self.raw.label_id()
    }

    /// The uncategorized detection underneath.
    pub fn raw(&self) -> &RawDetection {
        &self.raw
    }
}

impl Scored for Detection {
    fn bbox(&self) -> &BoundingBox {
        self.raw.bbox()
    }

    fn score(&self) -> f64 {
        self.raw.score()
    }
}
