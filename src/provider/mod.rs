//! Landmark providers: the seam to the pose detector.
//!
//! The pipeline never runs a pose model itself. It hands each prepared
//! image to a [`LandmarkProvider`] and gets back either a [`LandmarkSet`]
//! in the image's pixel space or a [`DetectError`].
//!
//! - [`SidecarProvider`] reads detector output stored next to each image.
//! - [`LazyProvider`] defers building an expensive provider until the
//!   first image arrives, then reuses it for its whole lifetime.
//! - Any `Fn(&PoseImage) -> Result<LandmarkSet, DetectError>` is a provider,
//!   which keeps test doubles and embedding glue small.

pub mod sidecar;

pub use sidecar::SidecarProvider;

use std::sync::OnceLock;

use thiserror::Error;

use crate::error::MetricError;
use crate::imaging::PoseImage;
use crate::landmark::LandmarkSet;

/// Why a provider returned no landmarks.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetectError {
    /// The detector ran but found no person.
    #[error("no pose detected")]
    NoPose,

    /// The detector could not run (bad input, missing model, I/O ...).
    #[error("{0}")]
    Failure(String),
}

impl From<DetectError> for MetricError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::NoPose => MetricError::NoPoseDetected,
            DetectError::Failure(message) => MetricError::ProviderFailure(message),
        }
    }
}

/// Something that finds pose landmarks in an image.
///
/// Landmarks must be reported in the pixel space of `image.raster`.
pub trait LandmarkProvider {
    fn detect(&self, image: &PoseImage) -> Result<LandmarkSet, DetectError>;
}

impl<F> LandmarkProvider for F
where
    F: Fn(&PoseImage) -> Result<LandmarkSet, DetectError>,
{
    fn detect(&self, image: &PoseImage) -> Result<LandmarkSet, DetectError> {
        self(image)
    }
}

/// Builds the wrapped provider on first use and reuses it afterwards.
///
/// The outcome of initialisation, including a failure, is kept for the
/// lifetime of the wrapper; every later `detect` sees the same provider or
/// the same error.
pub struct LazyProvider<P, F> {
    init: F,
    cell: OnceLock<Result<P, String>>,
}

impl<P, F> LazyProvider<P, F>
where
    F: Fn() -> Result<P, String>,
{
    pub fn new(init: F) -> Self {
        Self {
            init,
            cell: OnceLock::new(),
        }
    }

    /// Returns true once the provider has been built (or failed to build).
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    fn provider(&self) -> &Result<P, String> {
        self.cell.get_or_init(|| {
            let outcome = (self.init)();
            match &outcome {
                Ok(_) => tracing::info!("landmark provider initialised"),
                Err(message) => {
                    tracing::error!(error = %message, "landmark provider failed to initialise")
                }
            }
            outcome
        })
    }
}

impl<P, F> LandmarkProvider for LazyProvider<P, F>
where
    P: LandmarkProvider,
    F: Fn() -> Result<P, String>,
{
    fn detect(&self, image: &PoseImage) -> Result<LandmarkSet, DetectError> {
        match self.provider() {
            Ok(provider) => provider.detect(image),
            Err(message) => Err(DetectError::Failure(format!(
                "provider initialisation failed: {message}"
            ))),
        }
    }
}
