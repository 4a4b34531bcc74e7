#![allow(dead_code)]

use goniometry::landmark::{Joint, Landmark, LandmarkName, LandmarkSet, Point, Side};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

/// Angle agreement between two formulas, in degrees.
pub const EPS_DEGREES: f64 = 1e-6;

/// `acos` loses precision near 0 and 180 degrees.
pub const EPS_ACOS_DEGREES: f64 = 1e-4;

pub const LEG_JOINTS: [Joint; 4] = [Joint::Hip, Joint::Knee, Joint::Ankle, Joint::FootIndex];

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Any finite point in a generous pixel range.
pub fn arb_point() -> BoxedStrategy<Point> {
    (-5000.0f64..5000.0, -5000.0f64..5000.0)
        .prop_map(|(x, y)| Point::new(x, y))
        .boxed()
}

/// A point on the integer pixel grid, so reflections stay exact.
pub fn arb_grid_point() -> BoxedStrategy<Point> {
    (-1000i32..1000, -1000i32..1000)
        .prop_map(|(x, y)| Point::new(f64::from(x), f64::from(y)))
        .boxed()
}

/// Hip, knee, ankle and foot index for both sides, on the integer grid.
pub fn arb_leg_landmarks() -> BoxedStrategy<LandmarkSet> {
    prop::collection::vec(arb_grid_point(), 8)
        .prop_map(|points| {
            let names = [Side::Right, Side::Left]
                .into_iter()
                .flat_map(|side| LEG_JOINTS.map(|joint| LandmarkName::sided(side, joint)));
            let landmarks = names
                .zip(points)
                .map(|(name, p)| Landmark::new(name, p.x, p.y))
                .collect();
            LandmarkSet::new(landmarks).expect("distinct names and finite points")
        })
        .boxed()
}

/// True when no two landmarks share a position.
pub fn positions_distinct(set: &LandmarkSet) -> bool {
    let points: Vec<Point> = set.iter().map(|lm| lm.position).collect();
    points
        .iter()
        .enumerate()
        .all(|(i, a)| points[i + 1..].iter().all(|b| a != b))
}

/// Interior angle from the dot product, or `None` for a zero-length ray.
pub fn acos_angle(p1: Point, vertex: Point, p3: Point) -> Option<f64> {
    let (ax, ay) = (p1.x - vertex.x, p1.y - vertex.y);
    let (bx, by) = (p3.x - vertex.x, p3.y - vertex.y);
    let norms = ax.hypot(ay) * bx.hypot(by);
    if norms == 0.0 {
        return None;
    }
    let cos = ((ax * bx + ay * by) / norms).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}
