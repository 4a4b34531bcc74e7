//! The angle engine.
//!
//! Every metric is a three-point angle measured at a vertex. The raw
//! `atan2` difference can land anywhere in [0°, 360°] depending on which ray
//! comes first and which way it turns, so it is always folded back to the
//! interior angle in [0°, 180°].

use serde::Serialize;

use super::keypoints::select_points;
use super::Metric;
use crate::error::MetricError;
use crate::landmark::{Joint, LandmarkName, LandmarkSet, Point, Side};

/// Distance of synthetic reference points from their anchor landmark, in
/// landmark pixel units. Only the direction matters to the angle.
pub const REFERENCE_OFFSET: f64 = 100.0;

/// Interior angle at `vertex` between the rays to `p1` and `p3`, in degrees.
///
/// The result is in [0, 180] and does not depend on which of `p1`/`p3`
/// is given first.
pub fn raw_angle(p1: Point, vertex: Point, p3: Point) -> f64 {
    let theta = vertex.heading_to(&p3) - vertex.heading_to(&p1);
    let degrees = theta.abs().to_degrees();
    let folded = if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    };
    // |theta| can exceed 2*pi by an ulp when both headings sit on the
    // negative x axis.
    folded.clamp(0.0, 180.0)
}

/// The three points an angle is measured from; `vertex` is in the middle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AngleOperands {
    pub first: Point,
    pub vertex: Point,
    pub last: Point,
}

impl AngleOperands {
    pub fn new(first: Point, vertex: Point, last: Point) -> Self {
        Self {
            first,
            vertex,
            last,
        }
    }

    pub fn angle(&self) -> f64 {
        raw_angle(self.first, self.vertex, self.last)
    }
}

/// A successful measurement of one metric.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AngleMeasurement {
    pub metric: Metric,
    pub side: Side,
    pub degrees: f64,
    pub operands: AngleOperands,
}

/// Resolves the three operand points for `metric` on `side`.
///
/// `hipFlexion` and `popliteal` have no natural third landmark and use a
/// synthetic point instead:
/// - hip flexion: a point level with the hip, towards the front of the
///   body (`+x` for the right side, `-x` for the left);
/// - popliteal: a point directly above the knee.
pub fn resolve_operands(
    metric: Metric,
    side: Side,
    landmarks: &LandmarkSet,
) -> Result<AngleOperands, MetricError> {
    let selected = select_points(metric, side, landmarks)?;
    let point = |joint: Joint| {
        let name = LandmarkName::sided(side, joint);
        selected
            .get(name)
            .ok_or(MetricError::MissingLandmark { name })
    };

    let operands = match metric {
        Metric::Ankle => AngleOperands::new(
            point(Joint::Knee)?,
            point(Joint::Ankle)?,
            point(Joint::FootIndex)?,
        ),
        Metric::Knee => AngleOperands::new(
            point(Joint::Hip)?,
            point(Joint::Knee)?,
            point(Joint::Ankle)?,
        ),
        Metric::HipFlexion => {
            let hip = point(Joint::Hip)?;
            let forward = match side {
                Side::Right => REFERENCE_OFFSET,
                Side::Left => -REFERENCE_OFFSET,
            };
            AngleOperands::new(point(Joint::Knee)?, hip, hip.offset(forward, 0.0))
        }
        // R1 and R2 are the same geometry under two clinical labels.
        Metric::R1 | Metric::R2 => AngleOperands::new(
            point(Joint::Ankle)?,
            point(Joint::Knee)?,
            point(Joint::Hip)?,
        ),
        Metric::Popliteal => {
            let knee = point(Joint::Knee)?;
            AngleOperands::new(
                point(Joint::Ankle)?,
                knee,
                knee.offset(0.0, -REFERENCE_OFFSET),
            )
        }
    };

    Ok(operands)
}

/// Computes the angle for `metric` on `side`, in degrees.
pub fn metric_angle(
    metric: Metric,
    side: Side,
    landmarks: &LandmarkSet,
) -> Result<f64, MetricError> {
    resolve_operands(metric, side, landmarks).map(|operands| operands.angle())
}

/// Like [`metric_angle`], but takes the metric's wire name.
pub fn metric_angle_by_name(
    metric: &str,
    side: Side,
    landmarks: &LandmarkSet,
) -> Result<f64, MetricError> {
    metric_angle(metric.parse()?, side, landmarks)
}

/// Computes the full measurement for `metric` on `side`.
pub fn measure(
    metric: Metric,
    side: Side,
    landmarks: &LandmarkSet,
) -> Result<AngleMeasurement, MetricError> {
    let operands = resolve_operands(metric, side, landmarks)?;
    Ok(AngleMeasurement {
        metric,
        side,
        degrees: operands.angle(),
        operands,
    })
}
