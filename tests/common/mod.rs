#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Knee angle of the `knee_*` fixtures: 90 degrees + atan(80 / 50).
pub const KNEE_FIXTURE_DEGREES: f64 = 147.994_616_791_916_5;

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn bmp_bytes(width: u32, height: u32) -> Vec<u8> {
    let row_stride = (width * 3).div_ceil(4) * 4;
    let pixel_array_size = row_stride * height;
    let file_size = 54 + pixel_array_size;

    let mut bytes = Vec::with_capacity(file_size as usize);
    bytes.extend_from_slice(b"BM");
    bytes.extend_from_slice(&file_size.to_le_bytes());
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&54u32.to_le_bytes());

    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&(width as i32).to_le_bytes());
    bytes.extend_from_slice(&(height as i32).to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_array_size.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&2835u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());

    bytes.resize(file_size as usize, 0);
    bytes
}

pub fn write_bmp(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, bmp_bytes(width, height)).expect("write bmp file");
}

/// Writes `<dir>/<stem>.bmp` and, if given, copies the named fixture next to
/// it as `<stem>.landmarks.json`. Returns the image path.
pub fn write_image_with_sidecar(dir: &Path, stem: &str, sidecar_fixture: Option<&str>) -> PathBuf {
    let image = dir.join(format!("{stem}.bmp"));
    write_bmp(&image, 200, 400);
    if let Some(name) = sidecar_fixture {
        fs::copy(fixture(name), dir.join(format!("{stem}.landmarks.json")))
            .expect("copy sidecar fixture");
    }
    image
}
