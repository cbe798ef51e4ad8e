//! Detection values, the category taxonomy, and JSON ingestion.
//!
//! Detections enter detpipe as JSON records from a model wrapper. Records
//! are validated when they are converted to [`RawDetection`]: a misordered
//! box, a score outside `[0, 1]` or an empty label is rejected up front
//! rather than clamped, so upstream model bugs surface instead of hiding.

mod category;
pub mod io_json;
mod model;

pub use category::{Category, CategoryTable, DEFAULT_LABELS};
pub use model::{Detection, DetectionRecord, InvalidDetectionError, RawDetection, Scored};
