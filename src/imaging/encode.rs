//! Encoding annotated images as `data:` URIs.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbImage};
use serde::{Deserialize, Serialize};

use super::ImagingError;

/// Raster format used for returned images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    /// Smaller payloads; the default.
    #[default]
    Jpeg,
    Png,
}

impl ImageEncoding {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageEncoding::Jpeg => "image/jpeg",
            ImageEncoding::Png => "image/png",
        }
    }

    fn format(self) -> ImageFormat {
        match self {
            ImageEncoding::Jpeg => ImageFormat::Jpeg,
            ImageEncoding::Png => ImageFormat::Png,
        }
    }
}

impl std::str::FromStr for ImageEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(ImageEncoding::Jpeg),
            "png" => Ok(ImageEncoding::Png),
            other => Err(format!("'{other}' (supported: jpeg, png)")),
        }
    }
}

/// Encodes `image` and wraps it as `data:<mime>;base64,<payload>`.
pub fn encode_data_uri(image: &RgbImage, encoding: ImageEncoding) -> Result<String, ImagingError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, encoding.format())
        .map_err(ImagingError::Encode)?;

    Ok(format!(
        "data:{};base64,{}",
        encoding.mime_type(),
        STANDARD.encode(buffer.into_inner())
    ))
}
