//! Clinical lower-limb metrics.
//!
//! Each [`Metric`] is a fixed three-point angle measurement. The
//! [`keypoints`] module knows which landmarks a metric needs, and the
//! [`angle`] module turns those landmarks into a folded angle in
//! [0°, 180°].

pub mod angle;
pub mod keypoints;

pub use angle::{
    measure, metric_angle, metric_angle_by_name, raw_angle, resolve_operands, AngleMeasurement,
    AngleOperands, REFERENCE_OFFSET,
};
pub use keypoints::{required_landmark_names, select_points, SelectedPoints};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// One of the six measurements the service computes.
///
/// Variant order is the order results are reported in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "ankle")]
    Ankle,
    #[serde(rename = "knee")]
    Knee,
    #[serde(rename = "hipFlexion")]
    HipFlexion,
    #[serde(rename = "R1")]
    R1,
    #[serde(rename = "popliteal")]
    Popliteal,
    #[serde(rename = "R2")]
    R2,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Ankle,
        Metric::Knee,
        Metric::HipFlexion,
        Metric::R1,
        Metric::Popliteal,
        Metric::R2,
    ];

    /// The wire name used in requests and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Ankle => "ankle",
            Metric::Knee => "knee",
            Metric::HipFlexion => "hipFlexion",
            Metric::R1 => "R1",
            Metric::Popliteal => "popliteal",
            Metric::R2 => "R2",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = MetricError;

    /// Parses a wire name. Matching is exact, as clients send the names
    /// verbatim as multipart field names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| MetricError::UnknownMetric(s.to_string()))
    }
}
