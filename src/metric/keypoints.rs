//! Keypoint selection: which landmarks a metric needs, and pulling them
//! out of a detected [`LandmarkSet`].

use super::Metric;
use crate::error::MetricError;
use crate::landmark::{Joint, LandmarkName, LandmarkSet, Point, Side};

/// The joints a metric is measured from, in operand order.
///
/// Two-joint metrics complete their triple with a synthetic reference point.
fn required_joints(metric: Metric) -> &'static [Joint] {
    match metric {
        Metric::Ankle => &[Joint::Knee, Joint::Ankle, Joint::FootIndex],
        Metric::Knee => &[Joint::Hip, Joint::Knee, Joint::Ankle],
        Metric::HipFlexion => &[Joint::Knee, Joint::Hip],
        Metric::R1 => &[Joint::Ankle, Joint::Knee, Joint::Hip],
        Metric::Popliteal => &[Joint::Ankle, Joint::Knee],
        Metric::R2 => &[Joint::Ankle, Joint::Knee, Joint::Hip],
    }
}

/// Returns the landmark names `metric` needs on `side`, in operand order.
pub fn required_landmark_names(metric: Metric, side: Side) -> Vec<LandmarkName> {
    required_joints(metric)
        .iter()
        .map(|&joint| LandmarkName::sided(side, joint))
        .collect()
}

/// Landmark positions picked for one metric, in operand order.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedPoints {
    points: Vec<(LandmarkName, Point)>,
}

impl SelectedPoints {
    pub fn get(&self, name: LandmarkName) -> Option<Point> {
        self.points
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|&(_, point)| point)
    }

    /// The `index`-th required point.
    pub fn nth(&self, index: usize) -> Option<Point> {
        self.points.get(index).map(|&(_, point)| point)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(LandmarkName, Point)> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Extracts the positions of every landmark `metric` needs on `side`.
///
/// Fails on the first absent landmark, naming it.
pub fn select_points(
    metric: Metric,
    side: Side,
    landmarks: &LandmarkSet,
) -> Result<SelectedPoints, MetricError> {
    let points = required_landmark_names(metric, side)
        .into_iter()
        .map(|name| {
            landmarks
                .position(name)
                .map(|point| (name, point))
                .ok_or(MetricError::MissingLandmark { name })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SelectedPoints { points })
}
