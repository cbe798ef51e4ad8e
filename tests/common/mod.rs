#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

pub const FIXTURE_WIDTH: u32 = 200;
pub const FIXTURE_HEIGHT: u32 = 160;

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Writes a solid gray PNG and returns its path.
pub fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([90, 90, 90]))
        .save(&path)
        .expect("write test png");
    path
}

/// A PNG matching the coordinate space of `detections.json`.
pub fn write_fixture_image(dir: &Path) -> PathBuf {
    write_png(dir, "frame.png", FIXTURE_WIDTH, FIXTURE_HEIGHT)
}
