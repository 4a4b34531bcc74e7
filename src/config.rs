//! Pipeline configuration, optionally loaded from a YAML file.
//!
//! Every field has a default, so an empty file (or no file) is valid:
//!
//! ```yaml
//! max_dimension: 800
//! encoding: png
//! include_images: true
//! concurrent: false
//! landmarks:
//!   suffix: .landmarks.json
//!   directory: detections/
//! annotation:
//!   line_thickness: 3
//!   label_size: 28
//!   measurement_color: [255, 0, 0]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GoniometryError;
use crate::imaging::{AnnotationStyle, ImageEncoding, DEFAULT_MAX_DIMENSION};
use crate::provider::sidecar::DEFAULT_SUFFIX;

/// Settings for one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Longest side of the working image; 0 keeps the original size.
    pub max_dimension: u32,

    pub encoding: ImageEncoding,

    /// Attach annotated images to the response.
    pub include_images: bool,

    /// Process metrics on scoped threads instead of one after another.
    pub concurrent: bool,

    pub landmarks: SidecarConfig,

    pub annotation: AnnotationStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            encoding: ImageEncoding::default(),
            include_images: true,
            concurrent: false,
            landmarks: SidecarConfig::default(),
            annotation: AnnotationStyle::default(),
        }
    }
}

/// Where landmark sidecar files are found.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SidecarConfig {
    pub suffix: String,
    pub directory: Option<PathBuf>,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_SUFFIX.to_string(),
            directory: None,
        }
    }
}

impl PipelineConfig {
    /// Reads a config file. Missing fields take their defaults; annotation
    /// sizes outside the drawable limits are an error.
    pub fn load(path: &Path) -> Result<Self, GoniometryError> {
        let data = fs::read_to_string(path).map_err(|source| GoniometryError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config =
            Self::from_yaml_str(&data).map_err(|source| GoniometryError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config
            .annotation
            .validate()
            .map_err(|message| GoniometryError::InvalidConfig {
                path: path.to_path_buf(),
                message,
            })?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // serde_yaml reads an empty document as unit, not an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}
