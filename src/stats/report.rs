//! Statistics types and terminal formatting.
//!
//! Statistics serialize to JSON for the result bundle and render as a
//! compact text report through `Display`.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::detection::{Category, Detection, Scored};

/// Width of the histogram bars in the text report.
const BAR_WIDTH: usize = 20;

/// Counts over one detection set.
///
/// Maps only contain keys that occur; an absent key means zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Number of detections.
    pub total: usize,
    /// Detections per category.
    pub by_category: BTreeMap<Category, usize>,
    /// Detections per class label.
    pub by_class: BTreeMap<String, usize>,
}

impl Statistics {
    /// Class labels sorted by count descending, then name.
    pub fn classes_by_count(&self) -> Vec<(&str, usize)> {
        let mut sorted: Vec<(&str, usize)> = self
            .by_class
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Detections: {}", self.total)?;

        if self.total == 0 {
            return writeln!(f, "  No objects detected.");
        }

        let max_count = self.by_category.values().copied().max().unwrap_or(0);
        writeln!(f)?;
        writeln!(f, "By category:")?;
        for (category, count) in &self.by_category {
            writeln!(
                f,
                "  {:<16} {:>6} {:>6}  {}",
                category.as_str(),
                count,
                fmt_percent(*count, self.total),
                render_bar(*count, max_count, BAR_WIDTH)
            )?;
        }

        let classes = self.classes_by_count();
        let max_count = classes.first().map(|(_, c)| *c).unwrap_or(0);
        writeln!(f)?;
        writeln!(f, "By class:")?;
        for (label, count) in classes {
            writeln!(
                f,
                "  {:<16} {:>6} {:>6}  {}",
                truncate_label(label, 16),
                count,
                fmt_percent(count, self.total),
                render_bar(count, max_count, BAR_WIDTH)
            )?;
        }

        Ok(())
    }
}

/// A per-detection text listing, one block per detection.
#[derive(Clone, Copy, Debug)]
pub struct DetectionSummary<'a> {
    pub detections: &'a [Detection],
}

impl fmt::Display for DetectionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Object Detection Summary")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f)?;
        writeln!(f, "Total detections: {}", self.detections.len())?;
        writeln!(f)?;

        for (idx, det) in self.detections.iter().enumerate() {
            writeln!(f, "Detection {}:", idx + 1)?;
            writeln!(f, "  Label: {}", det.label())?;
            writeln!(f, "  Category: {}", det.category)?;
            writeln!(f, "  Confidence: {:.4}", det.score())?;
            writeln!(f, "  Bounding Box: {}", det.bbox())?;
            writeln!(f)?;
        }

        Ok(())
    }
}

/// Format a percentage, handling zero denominators.
fn fmt_percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        "n/a".to_string()
    } else {
        format!("{:.1}%", (numerator as f64 / denominator as f64) * 100.0)
    }
}

/// Render a horizontal bar using Unicode block characters.
fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }

    let filled = ((count * width) / max_count).min(width);
    "█".repeat(filled) + &"░".repeat(width - filled)
}

/// Truncate a label to fit in the display column.
fn truncate_label(label: &str, max_len: usize) -> String {
    if label.chars().count() <= max_len {
        label.to_string()
    } else {
        let head: String = label.chars().take(max_len - 1).collect();
        format!("{}…", head)
    }
}
