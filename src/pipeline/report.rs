//! Response types and their renderings.
//!
//! A response can be rendered as JSON (the per-metric wire payload), as a
//! text table (Display), or as CSV.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{GoniometryError, MetricError};
use crate::landmark::{LandmarkSet, Side};
use crate::metric::{AngleMeasurement, AngleOperands, Metric};

/// A metric that produced an angle.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredMetric {
    pub measurement: AngleMeasurement,

    /// Every landmark detected in the working image.
    pub landmarks: LandmarkSet,

    /// Annotated image as a `data:` URI, when images were requested and
    /// encoding succeeded.
    pub image: Option<String>,
}

/// A metric that produced no angle.
#[derive(Clone, Debug, PartialEq)]
pub struct FailedMetric {
    pub error: MetricError,

    /// The unannotated working image, when there was one to show.
    pub image: Option<String>,
}

impl FailedMetric {
    pub fn new(error: MetricError) -> Self {
        Self { error, image: None }
    }
}

pub type MetricOutcome = Result<MeasuredMetric, FailedMetric>;

/// Per-metric results of one request. Every metric has an entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzeResponse {
    pub side: Side,
    pub results: BTreeMap<Metric, MetricOutcome>,
}

/// The JSON object reported for one metric.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricPayload<'a> {
    pub angle: Option<f64>,
    pub image: Option<&'a str>,
    pub error: Option<String>,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operands: Option<AngleOperands>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keypoints: Option<&'a LandmarkSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
}

/// One CSV row.
#[derive(Serialize)]
struct CsvRow {
    metric: Metric,
    side: Side,
    angle: Option<f64>,
    error_kind: Option<&'static str>,
    error: Option<String>,
}

impl AnalyzeResponse {
    pub fn get(&self, metric: Metric) -> Option<&MetricOutcome> {
        self.results.get(&metric)
    }

    /// The angle for `metric`, if it was measured.
    pub fn angle(&self, metric: Metric) -> Option<f64> {
        match self.results.get(&metric)? {
            Ok(measured) => Some(measured.measurement.degrees),
            Err(_) => None,
        }
    }

    /// The error for `metric`, if it failed.
    pub fn error(&self, metric: Metric) -> Option<&MetricError> {
        match self.results.get(&metric)? {
            Ok(_) => None,
            Err(failed) => Some(&failed.error),
        }
    }

    pub fn success_count(&self) -> usize {
        self.results.values().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.len() - self.success_count()
    }

    /// Builds the wire payload for `metric`.
    pub fn payload(&self, metric: Metric) -> Option<MetricPayload<'_>> {
        let payload = match self.results.get(&metric)? {
            Ok(measured) => MetricPayload {
                angle: Some(measured.measurement.degrees),
                image: measured.image.as_deref(),
                error: None,
                side: self.side,
                operands: Some(measured.measurement.operands),
                keypoints: Some(&measured.landmarks),
                error_kind: None,
            },
            Err(failed) => MetricPayload {
                angle: None,
                image: failed.image.as_deref(),
                error: Some(failed.error.to_string()),
                side: self.side,
                operands: None,
                keypoints: None,
                error_kind: Some(failed.error.kind()),
            },
        };
        Some(payload)
    }

    pub fn to_json_string_pretty(&self) -> Result<String, GoniometryError> {
        serde_json::to_string_pretty(self).map_err(GoniometryError::JsonWrite)
    }

    /// Writes one row per metric with columns
    /// `metric,side,angle,error_kind,error`.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), GoniometryError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (metric, outcome) in &self.results {
            let row = match outcome {
                Ok(measured) => CsvRow {
                    metric: *metric,
                    side: self.side,
                    angle: Some(measured.measurement.degrees),
                    error_kind: None,
                    error: None,
                },
                Err(failed) => CsvRow {
                    metric: *metric,
                    side: self.side,
                    angle: None,
                    error_kind: Some(failed.error.kind()),
                    error: Some(failed.error.to_string()),
                },
            };
            csv_writer.serialize(&row)?;
        }

        csv_writer
            .into_inner()
            .map_err(|e| GoniometryError::Io(e.into_error()))?
            .flush()
            .map_err(GoniometryError::Io)
    }

    pub fn to_csv_string(&self) -> Result<String, GoniometryError> {
        let mut bytes = Vec::new();
        self.write_csv(&mut bytes)?;
        String::from_utf8(bytes)
            .map_err(|e| GoniometryError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

impl Serialize for AnalyzeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.results.len()))?;
        for metric in self.results.keys() {
            map.serialize_entry(metric, &self.payload(*metric))?;
        }
        map.end()
    }
}

impl fmt::Display for AnalyzeResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Measured {} of {} metric(s) on the {} side:",
            self.success_count(),
            self.results.len(),
            self.side
        )?;
        writeln!(f)?;

        for (metric, outcome) in &self.results {
            match outcome {
                Ok(measured) => {
                    let ops = &measured.measurement.operands;
                    writeln!(
                        f,
                        "  {:<11} {:>7.2}°  vertex {}",
                        metric.as_str(),
                        measured.measurement.degrees,
                        ops.vertex
                    )?;
                }
                Err(failed) => {
                    writeln!(
                        f,
                        "  {:<11} {:>8}  [{}] {}",
                        metric.as_str(),
                        "-",
                        failed.error.kind(),
                        failed.error
                    )?;
                }
            }
        }

        Ok(())
    }
}
