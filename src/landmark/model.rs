//! Landmarks and the per-image landmark set.

use serde::{Deserialize, Serialize};

use super::coord::Point;
use super::name::LandmarkName;
use super::LandmarkError;

/// A single detected anatomical point, in pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Which anatomical point this is.
    pub name: LandmarkName,

    /// Position in the analysed image.
    #[serde(flatten)]
    pub position: Point,

    /// Detector confidence that the point is visible, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    /// Creates a landmark at `(x, y)` with no visibility score.
    pub fn new(name: LandmarkName, x: f64, y: f64) -> Self {
        Self {
            name,
            position: Point::new(x, y),
            visibility: None,
        }
    }

    /// Sets the visibility score.
    pub fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = Some(visibility);
        self
    }
}

/// All landmarks detected in one image, in detector order.
///
/// Names are unique and every position is finite; [`LandmarkSet::new`]
/// rejects anything else so the angle engine never sees NaN.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    /// Builds a set, checking name uniqueness and coordinate finiteness.
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self, LandmarkError> {
        let mut seen = [false; LandmarkName::ALL.len()];
        for landmark in &landmarks {
            let slot = &mut seen[landmark.name.index()];
            if *slot {
                return Err(LandmarkError::DuplicateName(landmark.name));
            }
            *slot = true;

            if !landmark.position.is_finite() {
                return Err(LandmarkError::NonFinite {
                    name: landmark.name,
                });
            }
        }
        Ok(Self { landmarks })
    }

    /// Looks up a landmark by name.
    pub fn get(&self, name: LandmarkName) -> Option<&Landmark> {
        self.landmarks.iter().find(|lm| lm.name == name)
    }

    /// Position of a landmark by name.
    pub fn position(&self, name: LandmarkName) -> Option<Point> {
        self.get(name).map(|lm| lm.position)
    }

    pub fn contains(&self, name: LandmarkName) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    /// Returns a copy without the named landmark.
    pub fn without(&self, name: LandmarkName) -> Self {
        Self {
            landmarks: self
                .landmarks
                .iter()
                .copied()
                .filter(|lm| lm.name != name)
                .collect(),
        }
    }

    /// Reflects the set about the vertical line `x = axis_x` and swaps
    /// left/right names, as if the subject had been photographed in a mirror.
    pub fn mirrored(&self, axis_x: f64) -> Self {
        Self {
            landmarks: self
                .landmarks
                .iter()
                .map(|lm| Landmark {
                    name: lm.name.mirrored(),
                    position: Point::new(2.0 * axis_x - lm.position.x, lm.position.y),
                    visibility: lm.visibility,
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a LandmarkSet {
    type Item = &'a Landmark;
    type IntoIter = std::slice::Iter<'a, Landmark>;

    fn into_iter(self) -> Self::IntoIter {
        self.landmarks.iter()
    }
}
