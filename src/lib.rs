//! Goniometry: clinical lower-limb joint angles from pose landmarks.
//!
//! Six measurements (`ankle`, `knee`, `hipFlexion`, `R1`, `popliteal`,
//! `R2`) are each taken from their own image. A landmark provider finds the
//! body's keypoints, three of them (or two plus a synthetic reference
//! point) form an angle at a vertex, and the folded interior angle in
//! [0°, 180°] is reported together with an annotated copy of the image.
//!
//! # Modules
//!
//! - [`landmark`]: landmark names, coordinates, sets, and sidecar JSON
//! - [`metric`]: keypoint selection and the angle engine
//! - [`provider`]: the pose-detector seam
//! - [`imaging`]: decoding, resizing, annotation, data-URI encoding
//! - [`pipeline`]: per-metric processing and responses
//! - [`config`]: YAML pipeline configuration
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod imaging;
pub mod landmark;
pub mod metric;
pub mod pipeline;
pub mod provider;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub use config::PipelineConfig;
pub use error::{GoniometryError, MetricError};
pub use landmark::{Landmark, LandmarkName, LandmarkSet, Point, Side};
pub use metric::{measure, metric_angle, raw_angle, AngleMeasurement, Metric};
pub use pipeline::{AnalyzeRequest, AnalyzeResponse, ImageInput, MetricPipeline};
pub use provider::{DetectError, LandmarkProvider, LazyProvider, SidecarProvider};

use landmark::io_json::{read_landmark_json, DocumentSpace};

/// The goniometry CLI application.
#[derive(Parser)]
#[command(name = "goniometry")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log filter, e.g. 'info' or 'goniometry=debug'. Logs go to stderr.
    #[arg(long, global = true, env = "RUST_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Measure every metric that has an image.
    Measure(MeasureArgs),
    /// Compute one metric from a landmark JSON file.
    Angle(AngleArgs),
    /// List the landmarks a metric needs.
    Keypoints(KeypointsArgs),
}

/// Arguments for the measure subcommand.
#[derive(clap::Args)]
struct MeasureArgs {
    /// Image for the ankle angle.
    #[arg(long)]
    ankle: Option<PathBuf>,

    /// Image for the knee angle.
    #[arg(long)]
    knee: Option<PathBuf>,

    /// Image for the hip flexion angle.
    #[arg(long)]
    hip_flexion: Option<PathBuf>,

    /// Image for R1.
    #[arg(long = "r1")]
    r1: Option<PathBuf>,

    /// Image for the popliteal angle.
    #[arg(long)]
    popliteal: Option<PathBuf>,

    /// Image for R2.
    #[arg(long = "r2")]
    r2: Option<PathBuf>,

    /// Body side to measure ('right' or 'left').
    #[arg(long, default_value = "right")]
    side: String,

    /// Directory holding landmark sidecar files (default: next to each image).
    #[arg(long)]
    landmarks_dir: Option<PathBuf>,

    /// YAML pipeline configuration.
    #[arg(long, env = "GONIOMETRY_CONFIG")]
    config: Option<PathBuf>,

    /// Output format ('json', 'text', or 'csv').
    #[arg(long, default_value = "json")]
    output: String,

    /// Encoding of returned images ('jpeg' or 'png').
    #[arg(long)]
    encoding: Option<String>,

    /// Longest side of the working image; 0 disables resizing.
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Leave annotated images out of the response.
    #[arg(long)]
    no_images: bool,

    /// Process metrics in parallel.
    #[arg(long)]
    concurrent: bool,
}

/// Arguments for the angle subcommand.
#[derive(clap::Args)]
struct AngleArgs {
    /// Landmark JSON file.
    landmarks: PathBuf,

    /// Metric to compute (ankle, knee, hipFlexion, R1, popliteal, R2).
    #[arg(long)]
    metric: String,

    /// Body side ('right' or 'left').
    #[arg(long, default_value = "right")]
    side: String,

    /// Image width, for normalized landmarks.
    #[arg(long)]
    width: Option<u32>,

    /// Image height, for normalized landmarks.
    #[arg(long)]
    height: Option<u32>,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the keypoints subcommand.
#[derive(clap::Args)]
struct KeypointsArgs {
    /// Metric to describe.
    #[arg(long)]
    metric: String,

    /// Body side ('right' or 'left').
    #[arg(long, default_value = "right")]
    side: String,
}

/// Run the goniometry CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), GoniometryError> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Measure(args)) => run_measure(args),
        Some(Commands::Angle(args)) => run_angle(args),
        Some(Commands::Keypoints(args)) => run_keypoints(args),
        None => {
            println!("goniometry {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Clinical lower-limb joint angles from pose landmarks.");
            println!();
            println!("Run 'goniometry --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(filter: &str) -> Result<(), GoniometryError> {
    let filter =
        EnvFilter::try_new(filter).map_err(|e| GoniometryError::LoggingInit(e.to_string()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| GoniometryError::LoggingInit(e.to_string()))
}

fn check_output(output: &str, supported: &[&str]) -> Result<(), GoniometryError> {
    if supported.contains(&output) {
        Ok(())
    } else {
        Err(GoniometryError::UnsupportedFormat(format!(
            "output '{}' (supported: {})",
            output,
            supported.join(", ")
        )))
    }
}

/// Execute the measure subcommand.
fn run_measure(args: MeasureArgs) -> Result<(), GoniometryError> {
    check_output(&args.output, &["json", "text", "csv"])?;

    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(max_dimension) = args.max_dimension {
        config.max_dimension = max_dimension;
    }
    if let Some(encoding) = &args.encoding {
        config.encoding = encoding
            .parse()
            .map_err(|e| GoniometryError::UnsupportedFormat(format!("encoding {e}")))?;
    }
    if let Some(dir) = args.landmarks_dir {
        config.landmarks.directory = Some(dir);
    }
    config.include_images &= !args.no_images;
    config.concurrent |= args.concurrent;

    let named = [
        (Metric::Ankle, args.ankle),
        (Metric::Knee, args.knee),
        (Metric::HipFlexion, args.hip_flexion),
        (Metric::R1, args.r1),
        (Metric::Popliteal, args.popliteal),
        (Metric::R2, args.r2),
    ];
    let mut parts = Vec::new();
    for (metric, path) in named {
        if let Some(path) = path {
            parts.push((metric.as_str(), ImageInput::open(&path)));
        }
    }
    let request = AnalyzeRequest::from_parts(Some(&args.side), parts)?;

    let sidecars = config.landmarks.clone();
    let provider = LazyProvider::new(move || match &sidecars.directory {
        Some(dir) if !dir.is_dir() => Err(format!(
            "landmark directory not found: {}",
            dir.display()
        )),
        _ => Ok(SidecarProvider::from_config(&sidecars)),
    });

    let pipeline = MetricPipeline::new(&provider, config);
    let response = pipeline.run(&request)?;

    match args.output.as_str() {
        "text" => print!("{}", response),
        "csv" => response.write_csv(std::io::stdout().lock())?,
        _ => println!("{}", response.to_json_string_pretty()?),
    }

    Ok(())
}

/// Execute the angle subcommand.
fn run_angle(args: AngleArgs) -> Result<(), GoniometryError> {
    check_output(&args.output, &["text", "json"])?;
    let metric: Metric = args.metric.parse()?;
    let side: Side = args.side.parse()?;

    let document = read_landmark_json(&args.landmarks)?;
    let (width, height) = match (document.space, args.width, args.height) {
        (DocumentSpace::Pixel, width, height) => (width.unwrap_or(0), height.unwrap_or(0)),
        (DocumentSpace::Normalized, Some(width), Some(height)) => (width, height),
        (DocumentSpace::Normalized, _, _) => {
            return Err(GoniometryError::InvalidLandmarks {
                path: args.landmarks,
                message: "normalized landmarks need --width and --height".to_string(),
            });
        }
    };

    let landmarks = document
        .into_landmark_set(width, height)
        .map_err(|e| GoniometryError::InvalidLandmarks {
            path: args.landmarks.clone(),
            message: e.to_string(),
        })?
        .ok_or(MetricError::NoPoseDetected)?;

    let measurement = measure(metric, side, &landmarks)?;
    tracing::info!(metric = %metric, side = %side, angle = measurement.degrees, "angle computed");

    match args.output.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&measurement)
                .map_err(GoniometryError::JsonWrite)?;
            println!("{}", json);
        }
        _ => {
            let ops = &measurement.operands;
            println!(
                "{} ({}): {:.2}°",
                measurement.metric, measurement.side, measurement.degrees
            );
            println!("  first  {}", ops.first);
            println!("  vertex {}", ops.vertex);
            println!("  last   {}", ops.last);
        }
    }

    Ok(())
}

/// Execute the keypoints subcommand.
fn run_keypoints(args: KeypointsArgs) -> Result<(), GoniometryError> {
    let metric: Metric = args.metric.parse()?;
    let side: Side = args.side.parse()?;

    let mut stdout = std::io::stdout().lock();
    for name in crate::metric::required_landmark_names(metric, side) {
        writeln!(stdout, "{}", name)?;
    }
    Ok(())
}
