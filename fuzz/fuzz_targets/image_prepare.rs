//! Fuzz target for image probing and decoding.

#![no_main]

use goniometry::imaging::prepare_image;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = prepare_image(data, None, 64);
});
