use std::path::PathBuf;
use thiserror::Error;

use crate::landmark::LandmarkName;

/// The main error type for goniometry operations.
///
/// Per-metric problems are [`MetricError`]s and never abort a request;
/// this type covers everything that does.
#[derive(Debug, Error)]
pub enum GoniometryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read landmarks from {path}: {source}")]
    LandmarkRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse landmark JSON from {path}: {source}")]
    LandmarkJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid landmarks in {path}: {message}")]
    InvalidLandmarks { path: PathBuf, message: String },

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config from {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Invalid side '{0}' (expected 'right' or 'left')")]
    InvalidSide(String),

    #[error("No images provided")]
    NoImagesProvided,

    #[error("{0}")]
    Metric(#[from] MetricError),

    #[error("Failed to write JSON output: {0}")]
    JsonWrite(#[source] serde_json::Error),

    #[error("Failed to write CSV output: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to initialise logging: {0}")]
    LoggingInit(String),
}

/// Why a single metric produced no angle.
///
/// These are reported next to the metric in the response; sibling metrics
/// of the same request are unaffected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("No image provided")]
    NoImageProvided,

    #[error("No pose detected")]
    NoPoseDetected,

    #[error("Missing landmark {name}")]
    MissingLandmark { name: LandmarkName },

    #[error("Unknown metric '{0}' (expected one of: ankle, knee, hipFlexion, R1, popliteal, R2)")]
    UnknownMetric(String),

    #[error("Landmark provider failed: {0}")]
    ProviderFailure(String),
}

impl MetricError {
    /// A stable identifier for the error kind, for programmatic consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            MetricError::NoImageProvided => "NoImageProvided",
            MetricError::NoPoseDetected => "NoPoseDetected",
            MetricError::MissingLandmark { .. } => "MissingLandmark",
            MetricError::UnknownMetric(_) => "UnknownMetric",
            MetricError::ProviderFailure(_) => "ProviderFailure",
        }
    }
}
