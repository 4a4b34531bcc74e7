//! The metric pipeline: one image per metric in, one result per metric out.
//!
//! Each metric is processed on its own. A missing or unreadable image, a
//! failed decode, a detector that finds nobody or panics, and a missing
//! landmark only affect the metric they happened on; siblings in the same
//! request still report.
//!
//! The pipeline borrows its [`LandmarkProvider`] and never owns or
//! initialises it. In concurrent mode all metrics share that one provider,
//! so it must be `Sync`.

pub mod report;

pub use report::{AnalyzeResponse, FailedMetric, MeasuredMetric, MetricOutcome, MetricPayload};

use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;

use tracing::instrument;

use crate::config::PipelineConfig;
use crate::error::{GoniometryError, MetricError};
use crate::imaging::{encode_data_uri, prepare_image, Annotator, PoseImage};
use crate::landmark::Side;
use crate::metric::{measure, Metric};
use crate::provider::LandmarkProvider;

/// The bytes of one uploaded image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageInput {
    /// File the bytes were read from; providers may use it to find
    /// per-image data.
    pub source: Option<PathBuf>,
    pub bytes: Vec<u8>,

    /// Why `source` could not be read. The metric fails on its own.
    pub read_error: Option<String>,
}

impl ImageInput {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            source: None,
            bytes: bytes.into(),
            read_error: None,
        }
    }

    /// Reads an image file into memory.
    pub fn read(path: &Path) -> Result<Self, GoniometryError> {
        let bytes = fs::read(path).map_err(|source| GoniometryError::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            bytes,
            read_error: None,
        })
    }

    /// Like [`ImageInput::read`], but an unreadable file is kept as an
    /// input whose metric will fail instead of an error for the request.
    pub fn open(path: &Path) -> Self {
        Self::read(path).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "could not read image");
            Self {
                source: Some(path.to_path_buf()),
                bytes: Vec::new(),
                read_error: Some(err.to_string()),
            }
        })
    }

    /// Zero-length uploads count as absent.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.read_error.is_none()
    }
}

/// One measurement request: a side and up to one image per metric.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalyzeRequest {
    pub side: Side,
    pub images: BTreeMap<Metric, ImageInput>,
}

impl AnalyzeRequest {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            images: BTreeMap::new(),
        }
    }

    pub fn with_image(mut self, metric: Metric, image: ImageInput) -> Self {
        self.images.insert(metric, image);
        self
    }

    /// Builds a request from named upload parts.
    ///
    /// `side` defaults to right and is matched case-insensitively. Part
    /// names must be metric wire names; anything else is skipped with a
    /// warning. A later part with the same name replaces an earlier one.
    pub fn from_parts<I, S>(side: Option<&str>, parts: I) -> Result<Self, GoniometryError>
    where
        I: IntoIterator<Item = (S, ImageInput)>,
        S: AsRef<str>,
    {
        let side = match side {
            Some(raw) => raw.parse::<Side>()?,
            None => Side::default(),
        };

        let mut request = Self::new(side);
        for (name, image) in parts {
            match name.as_ref().parse::<Metric>() {
                Ok(metric) => {
                    request.images.insert(metric, image);
                }
                Err(_) => tracing::warn!(part = name.as_ref(), "ignoring unknown image part"),
            }
        }
        Ok(request)
    }

    /// Returns true if at least one metric has a non-empty image.
    pub fn has_usable_image(&self) -> bool {
        self.images.values().any(|image| !image.is_empty())
    }
}

/// Runs requests against a borrowed landmark provider.
pub struct MetricPipeline<'a, P: ?Sized> {
    provider: &'a P,
    annotator: Annotator,
    config: PipelineConfig,
}

impl<'a, P> MetricPipeline<'a, P>
where
    P: LandmarkProvider + ?Sized,
{
    pub fn new(provider: &'a P, config: PipelineConfig) -> Self {
        Self {
            provider,
            annotator: Annotator::new(config.annotation.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Processes every metric of `request`, one after another.
    ///
    /// The only request-level failure is a request without any usable
    /// image; everything else is reported per metric.
    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, GoniometryError> {
        self.check_request(request)?;

        let results = Metric::ALL
            .iter()
            .map(|&metric| {
                let outcome = self.isolated(metric, request.side, request.images.get(&metric));
                (metric, outcome)
            })
            .collect();

        Ok(self.finish(request.side, results))
    }

    /// Runs one metric, turning a panic anywhere below into its failure.
    fn isolated(&self, metric: Metric, side: Side, input: Option<&ImageInput>) -> MetricOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.analyze_metric(metric, side, input)))
            .unwrap_or_else(|_| {
                tracing::error!(metric = %metric, "metric panicked");
                Err(worker_panicked())
            })
    }

    /// Processes a single metric. Never fails the request.
    #[instrument(name = "MetricPipeline::analyze_metric", skip(self, input), level = "debug")]
    pub fn analyze_metric(
        &self,
        metric: Metric,
        side: Side,
        input: Option<&ImageInput>,
    ) -> MetricOutcome {
        let outcome = self.try_metric(metric, side, input);
        match &outcome {
            Ok(measured) => tracing::info!(
                metric = %metric,
                angle = measured.measurement.degrees,
                "metric measured"
            ),
            Err(failed) => tracing::warn!(
                metric = %metric,
                kind = failed.error.kind(),
                error = %failed.error,
                "metric failed"
            ),
        }
        outcome
    }

    fn try_metric(&self, metric: Metric, side: Side, input: Option<&ImageInput>) -> MetricOutcome {
        let input = match input {
            Some(input) if !input.is_empty() => input,
            _ => return Err(FailedMetric::new(MetricError::NoImageProvided)),
        };
        if let Some(reason) = &input.read_error {
            return Err(FailedMetric::new(MetricError::ProviderFailure(reason.clone())));
        }

        let image = prepare_image(
            &input.bytes,
            input.source.as_deref(),
            self.config.max_dimension,
        )
        .map_err(|err| FailedMetric::new(MetricError::ProviderFailure(err.to_string())))?;

        let landmarks = match self.provider.detect(&image) {
            Ok(landmarks) => landmarks,
            Err(err) => {
                let error = MetricError::from(err);
                let preview = match error {
                    MetricError::NoPoseDetected => self.preview(metric, &image),
                    _ => None,
                };
                return Err(FailedMetric {
                    error,
                    image: preview,
                });
            }
        };

        let measurement = measure(metric, side, &landmarks).map_err(FailedMetric::new)?;
        tracing::debug!(
            metric = %metric,
            first = %measurement.operands.first,
            vertex = %measurement.operands.vertex,
            last = %measurement.operands.last,
            "resolved operands"
        );

        let image = if self.config.include_images {
            let annotated = self.annotator.annotate(&image.raster, &landmarks, &measurement);
            self.encode(metric, &annotated)
        } else {
            None
        };

        Ok(MeasuredMetric {
            measurement,
            landmarks,
            image,
        })
    }

    /// The working image stamped "No pose detected".
    fn preview(&self, metric: Metric, image: &PoseImage) -> Option<String> {
        if !self.config.include_images {
            return None;
        }
        self.encode(metric, &self.annotator.no_pose(&image.raster))
    }

    fn encode(&self, metric: Metric, raster: &image::RgbImage) -> Option<String> {
        match encode_data_uri(raster, self.config.encoding) {
            Ok(uri) => Some(uri),
            Err(err) => {
                tracing::warn!(metric = %metric, error = %err, "could not encode image; omitting it");
                None
            }
        }
    }

    fn check_request(&self, request: &AnalyzeRequest) -> Result<(), GoniometryError> {
        tracing::info!(
            side = %request.side,
            images = request.images.len(),
            "analyzing request"
        );
        if request.has_usable_image() {
            Ok(())
        } else {
            Err(GoniometryError::NoImagesProvided)
        }
    }

    fn finish(&self, side: Side, results: BTreeMap<Metric, MetricOutcome>) -> AnalyzeResponse {
        let response = AnalyzeResponse { side, results };
        tracing::info!(
            measured = response.success_count(),
            failed = response.failure_count(),
            "request complete"
        );
        response
    }
}

impl<'a, P> MetricPipeline<'a, P>
where
    P: LandmarkProvider + Sync + ?Sized,
{
    /// Like [`MetricPipeline::analyze`], with one scoped thread per metric.
    ///
    /// Produces the same response as the sequential path.
    pub fn analyze_concurrent(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, GoniometryError> {
        self.check_request(request)?;

        let results = thread::scope(|scope| {
            let handles: Vec<_> = Metric::ALL
                .iter()
                .map(|&metric| {
                    let input = request.images.get(&metric);
                    let handle = scope.spawn(move || self.isolated(metric, request.side, input));
                    (metric, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(metric, handle)| {
                    let outcome = handle.join().unwrap_or_else(|_| Err(worker_panicked()));
                    (metric, outcome)
                })
                .collect::<BTreeMap<_, _>>()
        });

        Ok(self.finish(request.side, results))
    }

    /// Runs `request` sequentially or concurrently, as configured.
    pub fn run(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, GoniometryError> {
        if self.config.concurrent {
            self.analyze_concurrent(request)
        } else {
            self.analyze(request)
        }
    }
}

fn worker_panicked() -> FailedMetric {
    FailedMetric::new(MetricError::ProviderFailure(
        "metric worker panicked".to_string(),
    ))
}
