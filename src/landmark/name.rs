//! Landmark names of the 33-point full-body pose model.
//!
//! The enumeration order matches the model's output order, so a detector
//! that emits an unnamed array can be mapped with [`LandmarkName::from_index`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::LandmarkError;
use crate::error::GoniometryError;

macro_rules! landmark_names {
    ($($variant:ident => $label:literal | $mirror:ident,)+) => {
        /// A named anatomical point produced by pose detection.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        pub enum LandmarkName {
            $($variant,)+
        }

        impl LandmarkName {
            /// Every landmark in model order.
            pub const ALL: [LandmarkName; 33] = [$(LandmarkName::$variant,)+];

            /// The canonical `SCREAMING_SNAKE_CASE` label.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(LandmarkName::$variant => $label,)+
                }
            }

            /// The same anatomical point on the opposite body side.
            ///
            /// Midline landmarks (`NOSE`) map to themselves.
            pub fn mirrored(self) -> Self {
                match self {
                    $(LandmarkName::$variant => LandmarkName::$mirror,)+
                }
            }
        }
    };
}

landmark_names! {
    Nose => "NOSE" | Nose,
    LeftEyeInner => "LEFT_EYE_INNER" | RightEyeInner,
    LeftEye => "LEFT_EYE" | RightEye,
    LeftEyeOuter => "LEFT_EYE_OUTER" | RightEyeOuter,
    RightEyeInner => "RIGHT_EYE_INNER" | LeftEyeInner,
    RightEye => "RIGHT_EYE" | LeftEye,
    RightEyeOuter => "RIGHT_EYE_OUTER" | LeftEyeOuter,
    LeftEar => "LEFT_EAR" | RightEar,
    RightEar => "RIGHT_EAR" | LeftEar,
    MouthLeft => "MOUTH_LEFT" | MouthRight,
    MouthRight => "MOUTH_RIGHT" | MouthLeft,
    LeftShoulder => "LEFT_SHOULDER" | RightShoulder,
    RightShoulder => "RIGHT_SHOULDER" | LeftShoulder,
    LeftElbow => "LEFT_ELBOW" | RightElbow,
    RightElbow => "RIGHT_ELBOW" | LeftElbow,
    LeftWrist => "LEFT_WRIST" | RightWrist,
    RightWrist => "RIGHT_WRIST" | LeftWrist,
    LeftPinky => "LEFT_PINKY" | RightPinky,
    RightPinky => "RIGHT_PINKY" | LeftPinky,
    LeftIndex => "LEFT_INDEX" | RightIndex,
    RightIndex => "RIGHT_INDEX" | LeftIndex,
    LeftThumb => "LEFT_THUMB" | RightThumb,
    RightThumb => "RIGHT_THUMB" | LeftThumb,
    LeftHip => "LEFT_HIP" | RightHip,
    RightHip => "RIGHT_HIP" | LeftHip,
    LeftKnee => "LEFT_KNEE" | RightKnee,
    RightKnee => "RIGHT_KNEE" | LeftKnee,
    LeftAnkle => "LEFT_ANKLE" | RightAnkle,
    RightAnkle => "RIGHT_ANKLE" | LeftAnkle,
    LeftHeel => "LEFT_HEEL" | RightHeel,
    RightHeel => "RIGHT_HEEL" | LeftHeel,
    LeftFootIndex => "LEFT_FOOT_INDEX" | RightFootIndex,
    RightFootIndex => "RIGHT_FOOT_INDEX" | LeftFootIndex,
}

impl LandmarkName {
    /// Maps a model output index to its landmark name.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The model output index of this landmark.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The landmark for `joint` on the given body side.
    pub fn sided(side: Side, joint: Joint) -> Self {
        use LandmarkName::*;
        match (side, joint) {
            (Side::Right, Joint::Hip) => RightHip,
            (Side::Right, Joint::Knee) => RightKnee,
            (Side::Right, Joint::Ankle) => RightAnkle,
            (Side::Right, Joint::Heel) => RightHeel,
            (Side::Right, Joint::FootIndex) => RightFootIndex,
            (Side::Left, Joint::Hip) => LeftHip,
            (Side::Left, Joint::Knee) => LeftKnee,
            (Side::Left, Joint::Ankle) => LeftAnkle,
            (Side::Left, Joint::Heel) => LeftHeel,
            (Side::Left, Joint::FootIndex) => LeftFootIndex,
        }
    }
}

impl fmt::Display for LandmarkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LandmarkName {
    type Err = LandmarkError;

    /// Parses a landmark label case-insensitively (`right_knee` == `RIGHT_KNEE`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| LandmarkError::UnknownName(s.to_string()))
    }
}

impl Serialize for LandmarkName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LandmarkName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Body side selector.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Right,
    Left,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Right => "right",
            Side::Left => "left",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = GoniometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "right" => Ok(Side::Right),
            "left" => Ok(Side::Left),
            _ => Err(GoniometryError::InvalidSide(s.to_string())),
        }
    }
}

/// A lower-limb joint without its side prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Joint {
    Hip,
    Knee,
    Ankle,
    Heel,
    FootIndex,
}
