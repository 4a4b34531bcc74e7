//! Landmarks from JSON files written next to each image.

use std::path::{Path, PathBuf};

use super::{DetectError, LandmarkProvider};
use crate::config::SidecarConfig;
use crate::imaging::PoseImage;
use crate::landmark::io_json::read_landmark_json;
use crate::landmark::LandmarkSet;

/// Default file suffix for sidecar documents (`knee.jpg` →
/// `knee.landmarks.json`).
pub const DEFAULT_SUFFIX: &str = ".landmarks.json";

/// Reads pre-computed detector output for each image.
///
/// For an image at `dir/knee.jpg` the document is looked up at
/// `dir/knee.landmarks.json`, or under `directory` when one is configured.
#[derive(Clone, Debug)]
pub struct SidecarProvider {
    directory: Option<PathBuf>,
    suffix: String,
}

impl Default for SidecarProvider {
    fn default() -> Self {
        Self {
            directory: None,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl SidecarProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SidecarConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            suffix: config.suffix.clone(),
        }
    }

    /// Looks for sidecars in `directory` instead of next to the image.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Where the sidecar for `image_path` is expected.
    pub fn sidecar_path(&self, image_path: &Path) -> Option<PathBuf> {
        let stem = image_path.file_stem()?.to_string_lossy();
        let file_name = format!("{stem}{}", self.suffix);
        let dir = match &self.directory {
            Some(dir) => dir.clone(),
            None => image_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        Some(dir.join(file_name))
    }
}

impl LandmarkProvider for SidecarProvider {
    fn detect(&self, image: &PoseImage) -> Result<LandmarkSet, DetectError> {
        let source = image.source.as_deref().ok_or_else(|| {
            DetectError::Failure("image has no source path to locate landmarks".to_string())
        })?;
        let path = self.sidecar_path(source).ok_or_else(|| {
            DetectError::Failure(format!("cannot derive landmark file for {}", source.display()))
        })?;

        if !path.is_file() {
            return Err(DetectError::Failure(format!(
                "landmark file not found: {}",
                path.display()
            )));
        }

        let document =
            read_landmark_json(&path).map_err(|err| DetectError::Failure(err.to_string()))?;
        tracing::debug!(path = %path.display(), "read landmark sidecar");

        match document.into_landmark_set(image.width(), image.height()) {
            Ok(Some(set)) => Ok(set),
            Ok(None) => Err(DetectError::NoPose),
            Err(err) => Err(DetectError::Failure(format!(
                "invalid landmarks in {}: {err}",
                path.display()
            ))),
        }
    }
}
