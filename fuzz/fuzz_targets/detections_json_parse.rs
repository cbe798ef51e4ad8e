//! Fuzz target for detection JSON parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the detection parser and
//! the ingestion checks, checking for panics, crashes, or hangs.

#![no_main]

use detpipe::detection::io_json::{from_records_slice, into_raw_detections};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    if let Ok(records) = from_records_slice(data) {
        let _ = into_raw_detections(records);
    }
});
