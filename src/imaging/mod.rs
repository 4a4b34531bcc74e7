//! Image handling around the angle engine.
//!
//! Raw upload bytes are probed, decoded and shrunk to a working size here
//! before any landmark is detected; the landmarks, the angle and the
//! annotation overlay all live in the pixel space of that working image.
//!
//! - [`prepare_image`]: header probe (`imagesize`), decode (`image`), RGB
//!   conversion, aspect-preserving downscale.
//! - [`annotate`]: draws the skeleton and the measured angle.
//! - [`encode`]: PNG/JPEG encoding into a `data:` URI.

pub mod annotate;
pub mod encode;

pub use annotate::{AnnotationStyle, Annotator};
pub use encode::{encode_data_uri, ImageEncoding};

use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use image::RgbImage;
use thiserror::Error;

/// Default longest side of the working image.
pub const DEFAULT_MAX_DIMENSION: u32 = 800;

/// Images whose header claims more pixels than this are refused before
/// decoding.
pub const MAX_INPUT_PIXELS: u64 = 100_000_000;

/// Errors while turning upload bytes into a working image or back.
#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("empty image file")]
    Empty,

    #[error("unrecognised image header: {0}")]
    Probe(#[source] imagesize::ImageError),

    #[error("image is {width}x{height}, larger than the {limit} pixel limit")]
    TooLarge { width: u64, height: u64, limit: u64 },

    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("could not encode image: {0}")]
    Encode(#[source] image::ImageError),
}

/// A decoded, resized image ready for landmark detection.
#[derive(Clone, Debug)]
pub struct PoseImage {
    /// Where the image came from, if it was read from disk.
    pub source: Option<PathBuf>,

    /// The working raster. Landmarks are reported in its pixel space.
    pub raster: RgbImage,

    /// Dimensions of the image before resizing.
    pub original_size: (u32, u32),
}

impl PoseImage {
    /// Wraps an already-decoded raster.
    pub fn new(source: Option<PathBuf>, raster: RgbImage) -> Self {
        let original_size = raster.dimensions();
        Self {
            source,
            raster,
            original_size,
        }
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }
}

/// Working size for an image of `width` x `height`: unchanged if both sides
/// fit in `max_dimension`, otherwise the longest side becomes
/// `max_dimension` and the other keeps the aspect ratio.
pub fn working_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if max_dimension == 0 || (width <= max_dimension && height <= max_dimension) {
        return (width, height);
    }

    let scale = |side: u32, longest: u32| -> u32 {
        let scaled = u64::from(side) * u64::from(max_dimension) / u64::from(longest);
        u32::try_from(scaled).unwrap_or(max_dimension).max(1)
    };

    if height > width {
        (scale(width, height), max_dimension)
    } else {
        (max_dimension, scale(height, width))
    }
}

/// Decodes upload bytes into a [`PoseImage`], downscaling so that neither
/// side exceeds `max_dimension` (0 disables resizing).
pub fn prepare_image(
    bytes: &[u8],
    source: Option<&Path>,
    max_dimension: u32,
) -> Result<PoseImage, ImagingError> {
    if bytes.is_empty() {
        return Err(ImagingError::Empty);
    }

    let header = imagesize::blob_size(bytes).map_err(ImagingError::Probe)?;
    let (width, height) = (header.width as u64, header.height as u64);
    if width.saturating_mul(height) > MAX_INPUT_PIXELS {
        return Err(ImagingError::TooLarge {
            width,
            height,
            limit: MAX_INPUT_PIXELS,
        });
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(ImagingError::Decode)?
        .to_rgb8();
    let original_size = decoded.dimensions();

    let (target_w, target_h) = working_size(original_size.0, original_size.1, max_dimension);
    let raster = if (target_w, target_h) == original_size {
        decoded
    } else {
        tracing::debug!(
            from_width = original_size.0,
            from_height = original_size.1,
            to_width = target_w,
            to_height = target_h,
            "resizing image"
        );
        image::imageops::resize(&decoded, target_w, target_h, FilterType::Triangle)
    };

    Ok(PoseImage {
        source: source.map(Path::to_path_buf),
        raster,
        original_size,
    })
}
