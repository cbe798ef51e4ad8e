//! Display colors.

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::detection::{CategoryTable, Detection};

/// Cyclic palette for index-colored rendering.
pub const PALETTE: [Rgb<u8>; 8] = [
    Rgb([59, 130, 246]),  // blue
    Rgb([239, 68, 68]),   // red
    Rgb([16, 185, 129]),  // green
    Rgb([245, 158, 11]),  // orange
    Rgb([139, 92, 246]),  // purple
    Rgb([236, 72, 153]),  // pink
    Rgb([20, 184, 166]),  // teal
    Rgb([249, 115, 22]),  // dark orange
];

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// How each detection's display color is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// The category's color from the table. Also enables the tinted box fill.
    #[default]
    ByCategory,
    /// `PALETTE[index % PALETTE.len()]` by position in the detection list.
    ByIndexCyclic,
}

/// Resolves the color for the detection at `index`.
pub fn resolve_color(
    policy: ColorPolicy,
    table: &CategoryTable,
    detection: &Detection,
    index: usize,
) -> Rgb<u8> {
    match policy {
        ColorPolicy::ByCategory => table.color_of(detection.category),
        ColorPolicy::ByIndexCyclic => PALETTE[index % PALETTE.len()],
    }
}
