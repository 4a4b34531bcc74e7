//! JSON landmark documents written by an external pose detector.
//!
//! The format mirrors what common 33-point pose models emit:
//!
//! ```json
//! {
//!   "space": "normalized",
//!   "landmarks": [
//!     {"name": "RIGHT_HIP", "x": 0.41, "y": 0.52, "visibility": 0.98}
//!   ]
//! }
//! ```
//!
//! - `space` is `normalized` (default, fractions of the frame) or `pixel`.
//! - `name` may be omitted; the array index is then the model index.
//! - `landmarks: null` or an empty list means no pose was found.
//! - Unknown fields (`z`, `presence`, ...) are ignored.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::coord::Coord;
use super::model::{Landmark, LandmarkSet};
use super::name::LandmarkName;
use super::space::Normalized;
use super::LandmarkError;
use crate::error::GoniometryError;

/// Coordinate space of the positions in a [`LandmarkDocument`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentSpace {
    #[default]
    Normalized,
    Pixel,
}

/// One entry of a landmark document, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawLandmark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

/// A detector output file, as read from disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkDocument {
    #[serde(default)]
    pub space: DocumentSpace,

    #[serde(default)]
    pub landmarks: Option<Vec<RawLandmark>>,
}

impl LandmarkDocument {
    /// Returns true if the detector reported no pose.
    pub fn is_empty(&self) -> bool {
        self.landmarks.as_ref().map_or(true, |lms| lms.is_empty())
    }

    /// Converts the document into a pixel-space [`LandmarkSet`] for an image
    /// of `width` x `height` pixels.
    ///
    /// Returns `Ok(None)` when the document reports no pose.
    pub fn into_landmark_set(
        self,
        width: u32,
        height: u32,
    ) -> Result<Option<LandmarkSet>, LandmarkError> {
        let space = self.space;
        let raw = match self.landmarks {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        let landmarks = raw
            .into_iter()
            .enumerate()
            .map(|(index, entry)| -> Result<Landmark, LandmarkError> {
                let name = match entry.name.as_deref() {
                    Some(label) => label.parse::<LandmarkName>()?,
                    None => LandmarkName::from_index(index)
                        .ok_or(LandmarkError::IndexOutOfRange(index))?,
                };
                let position = match space {
                    DocumentSpace::Pixel => Coord::new(entry.x, entry.y),
                    DocumentSpace::Normalized => {
                        Coord::<Normalized>::new(entry.x, entry.y).to_pixel(width, height)
                    }
                };
                Ok(Landmark {
                    name,
                    position,
                    visibility: entry.visibility,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        LandmarkSet::new(landmarks).map(Some)
    }
}

/// Reads a landmark document from a JSON file.
pub fn read_landmark_json(path: &Path) -> Result<LandmarkDocument, GoniometryError> {
    let file = File::open(path).map_err(|source| GoniometryError::LandmarkRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| GoniometryError::LandmarkJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a landmark document from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<LandmarkDocument, serde_json::Error> {
    serde_json::from_str(json)
}

/// Reads a landmark document from raw bytes.
pub fn from_json_slice(bytes: &[u8]) -> Result<LandmarkDocument, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Writes a landmark set as a pixel-space document.
pub fn to_json_string(set: &LandmarkSet) -> Result<String, serde_json::Error> {
    let document = LandmarkDocument {
        space: DocumentSpace::Pixel,
        landmarks: Some(
            set.iter()
                .map(|lm| RawLandmark {
                    name: Some(lm.name.to_string()),
                    x: lm.position.x,
                    y: lm.position.y,
                    visibility: lm.visibility,
                })
                .collect(),
        ),
    };
    serde_json::to_string_pretty(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Point;

    #[test]
    fn normalized_document_scales_to_image() {
        let doc = from_json_str(
            r#"{"landmarks": [
                {"name": "RIGHT_HIP", "x": 0.5, "y": 0.25, "visibility": 0.9},
                {"name": "right_knee", "x": 0.5, "y": 0.5, "z": -0.1}
            ]}"#,
        )
        .unwrap();
        assert_eq!(doc.space, DocumentSpace::Normalized);

        let set = doc.into_landmark_set(400, 800).unwrap().unwrap();
        assert_eq!(
            set.position(LandmarkName::RightHip),
            Some(Point::new(200.0, 200.0))
        );
        assert_eq!(
            set.position(LandmarkName::RightKnee),
            Some(Point::new(200.0, 400.0))
        );
        assert_eq!(
            set.get(LandmarkName::RightHip).unwrap().visibility,
            Some(0.9)
        );
    }

    #[test]
    fn pixel_document_ignores_dimensions() {
        let doc = from_json_str(
            r#"{"space": "pixel", "landmarks": [{"name": "LEFT_ANKLE", "x": 12.0, "y": 34.0}]}"#,
        )
        .unwrap();
        let set = doc.into_landmark_set(1, 1).unwrap().unwrap();
        assert_eq!(
            set.position(LandmarkName::LeftAnkle),
            Some(Point::new(12.0, 34.0))
        );
    }

    #[test]
    fn unnamed_entries_use_model_index() {
        let doc = from_json_str(
            r#"{"space": "pixel", "landmarks": [{"x": 1.0, "y": 1.0}, {"x": 2.0, "y": 2.0}]}"#,
        )
        .unwrap();
        let set = doc.into_landmark_set(10, 10).unwrap().unwrap();
        assert!(set.contains(LandmarkName::Nose));
        assert!(set.contains(LandmarkName::LeftEyeInner));
    }

    #[test]
    fn unnamed_entries_beyond_model_are_rejected() {
        let entries: Vec<String> = (0..34).map(|_| r#"{"x":0.1,"y":0.1}"#.to_string()).collect();
        let json = format!(r#"{{"landmarks": [{}]}}"#, entries.join(","));
        let err = from_json_str(&json)
            .unwrap()
            .into_landmark_set(10, 10)
            .unwrap_err();
        assert_eq!(err, LandmarkError::IndexOutOfRange(33));
    }

    #[test]
    fn null_or_empty_landmarks_mean_no_pose() {
        for json in [r#"{"landmarks": null}"#, r#"{"landmarks": []}"#, "{}"] {
            let doc = from_json_str(json).unwrap();
            assert!(doc.is_empty());
            assert_eq!(doc.into_landmark_set(10, 10).unwrap(), None);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let doc = from_json_str(r#"{"landmarks": [{"name": "TAIL", "x": 0.1, "y": 0.1}]}"#)
            .unwrap();
        assert!(matches!(
            doc.into_landmark_set(10, 10),
            Err(LandmarkError::UnknownName(_))
        ));
    }

    #[test]
    fn written_document_reads_back() {
        let set = LandmarkSet::new(vec![
            Landmark::new(LandmarkName::RightHip, 10.0, 20.0),
            Landmark::new(LandmarkName::RightKnee, 30.0, 40.0).with_visibility(0.5),
        ])
        .unwrap();
        let json = to_json_string(&set).unwrap();
        let back = from_json_str(&json)
            .unwrap()
            .into_landmark_set(999, 999)
            .unwrap()
            .unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn read_landmark_json_reports_path_on_parse_error() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("broken.landmarks.json");
        std::fs::write(&path, "{not json").expect("write file");

        let err = read_landmark_json(&path).unwrap_err();
        assert!(matches!(err, GoniometryError::LandmarkJsonParse { .. }));
        assert!(err.to_string().contains("broken.landmarks.json"));
    }

    #[test]
    fn read_landmark_json_reports_path_when_file_is_missing() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let path = temp.path().join("absent.landmarks.json");

        let err = read_landmark_json(&path).unwrap_err();
        assert!(matches!(err, GoniometryError::LandmarkRead { .. }));
        assert!(err.to_string().contains("absent.landmarks.json"));
    }
}
