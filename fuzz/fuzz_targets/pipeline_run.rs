//! Fuzz target for the full pipeline.
//!
//! Any detection file that passes ingestion must run through filtering,
//! suppression and rendering without panicking, whatever its boxes look like.

#![no_main]

use detpipe::detection::io_json::{from_records_slice, into_raw_detections};
use detpipe::{CategoryTable, LabelFont, Pipeline, RenderOptions};
use image::RgbImage;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(records) = from_records_slice(data) else {
        return;
    };
    let Ok(raw) = into_raw_detections(records) else {
        return;
    };

    let pipeline = Pipeline::new(CategoryTable::default(), LabelFont::embedded().unwrap());
    let image = RgbImage::new(64, 48);
    let _ = pipeline.run(&raw, &image, 0.0, 0.5, &RenderOptions::default());
});
