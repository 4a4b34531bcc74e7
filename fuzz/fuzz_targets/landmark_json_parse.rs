//! Fuzz target for landmark sidecar parsing.
//!
//! Feeds arbitrary bytes to the JSON parser and, when they parse, converts
//! the document into a landmark set and measures every metric on it,
//! checking for panics and out-of-range angles.

#![no_main]

use goniometry::landmark::io_json::from_json_slice;
use goniometry::landmark::Side;
use goniometry::metric::{metric_angle, Metric};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(document) = from_json_slice(data) else {
        return;
    };
    let Ok(Some(landmarks)) = document.into_landmark_set(640, 480) else {
        return;
    };

    for side in [Side::Right, Side::Left] {
        for metric in Metric::ALL {
            if let Ok(angle) = metric_angle(metric, side, &landmarks) {
                assert!((0.0..=180.0).contains(&angle), "angle {angle} out of range");
            }
        }
    }
});
