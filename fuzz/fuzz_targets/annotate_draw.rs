//! Fuzz target for the overlay drawing primitives.
//!
//! Arbitrary (including non-finite and far off-canvas) points must never
//! panic or hang the annotator.

#![no_main]

use goniometry::imaging::annotate::fuzz_draw;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u8, u8, [(f64, f64); 3])| {
    let (width, height, points) = input;
    fuzz_draw(u32::from(width), u32::from(height), points);
});
