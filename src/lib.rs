//! Detpipe: object detection post-processing.
//!
//! Detpipe takes the raw per-box output of a detection model and turns it
//! into a clean result: low-confidence boxes are dropped, overlapping boxes
//! are suppressed, labels are grouped into categories, counts are
//! aggregated and the survivors are drawn onto the image.
//!
//! # Modules
//!
//! - [`geom`]: Bounding boxes and IoU
//! - [`nms`]: Greedy non-maximum suppression
//! - [`classify`]: Confidence filtering and category assignment
//! - [`stats`]: Detection counts and text reports
//! - [`render`]: Box, fill and label rendering
//! - [`pipeline`]: The fixed end-to-end pipeline
//! - [`detection`]: Detection types and JSON ingestion
//! - [`validation`]: Lenient checking of detection files
//! - [`config`]: YAML configuration
//! - [`error`]: Error types for detpipe operations

pub mod classify;
pub mod config;
pub mod detection;
pub mod error;
pub mod geom;
pub mod nms;
pub mod pipeline;
pub mod render;
pub mod stats;
pub mod validation;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use image::RgbImage;
use serde::Serialize;
use tracing::{info, warn};

pub use config::Config;
pub use detection::{Category, CategoryTable, Detection, RawDetection, Scored};
pub use error::DetpipeError;
pub use geom::BoundingBox;
pub use pipeline::{Pipeline, PipelineParams, PipelineRequest, PipelineResult};
pub use render::{AnnotatedImage, ColorPolicy, LabelFont, RenderOptions, Renderer};
pub use stats::Statistics;

/// The detpipe CLI application.
#[derive(Parser)]
#[command(name = "detpipe")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true, env = "DETPIPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Filter, suppress, categorize and draw detections onto an image.
    Run(RunArgs),
    /// Count detections by category and class without filtering.
    Stats(StatsArgs),
    /// Check a detection file for errors and warnings.
    Validate(ValidateArgs),
    /// Paste several images into one comparison grid.
    Grid(GridArgs),
}

/// Arguments for the run subcommand.
#[derive(clap::Args)]
struct RunArgs {
    /// Raw detections JSON file.
    detections: PathBuf,

    /// Image the detections belong to.
    #[arg(long)]
    image: PathBuf,

    /// Where to write the annotated image.
    #[arg(short, long)]
    output: PathBuf,

    /// Also write the detections and statistics as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Minimum confidence score (overrides config).
    #[arg(long)]
    confidence: Option<f64>,

    /// IoU suppression threshold (overrides config).
    #[arg(long)]
    iou: Option<f64>,

    /// Color boxes by position in the list instead of by category.
    #[arg(long)]
    color_by_index: bool,

    /// Outline width in pixels (overrides config).
    #[arg(long)]
    line_thickness: Option<u32>,

    /// Do not draw labels.
    #[arg(long)]
    no_labels: bool,

    /// Do not append scores to labels.
    #[arg(long)]
    no_confidence: bool,

    /// TrueType font for labels (overrides config).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Report format on stdout ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,

    /// Include a per-detection listing in the text report.
    #[arg(long)]
    summary: bool,
}

/// Arguments for the stats subcommand.
#[derive(clap::Args)]
struct StatsArgs {
    /// Raw detections JSON file.
    detections: PathBuf,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Raw detections JSON file.
    detections: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Image width for out-of-bounds checks.
    #[arg(long, requires = "height", conflicts_with = "image")]
    width: Option<u32>,

    /// Image height for out-of-bounds checks.
    #[arg(long, requires = "width", conflicts_with = "image")]
    height: Option<u32>,

    /// Read the image size for out-of-bounds checks from this image.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the grid subcommand.
#[derive(clap::Args)]
struct GridArgs {
    /// Images to combine, in row-major order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Where to write the grid image.
    #[arg(short, long)]
    output: PathBuf,

    /// Caption for each image, in order.
    #[arg(long = "title")]
    titles: Vec<String>,

    /// Number of columns (default: ceil(sqrt(n))).
    #[arg(long)]
    columns: Option<u32>,
}

/// Run the detpipe CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), DetpipeError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            Config::from_path(path)?
        }
        None => Config::default(),
    };

    match cli.command {
        Some(Commands::Run(args)) => run_pipeline(args, &config),
        Some(Commands::Stats(args)) => run_stats(args, &config),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Grid(args)) => run_grid(args, &config),
        None => {
            println!("detpipe {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Object detection post-processing.");
            println!();
            println!("Run 'detpipe --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the run subcommand.
fn run_pipeline(args: RunArgs, config: &Config) -> Result<(), DetpipeError> {
    check_report_format(&args.report)?;

    let params = run_params(&args, config);
    params.validate()?;

    let font = match &args.font {
        Some(path) => LabelFont::from_path(path)?,
        None => config.font()?,
    };
    let pipeline = Pipeline::new(config.category_table(), font);

    let raw = detection::io_json::read_detections(&args.detections)?;
    let image = image::open(&args.image)?.to_rgb8();
    info!(
        detections = raw.len(),
        width = image.width(),
        height = image.height(),
        "loaded inputs"
    );
    warn_out_of_frame(&raw, &image);

    let result = pipeline.run_with(&raw, &image, &params);

    result.annotated_image.annotated.save(&args.output)?;
    info!(path = %args.output.display(), "wrote annotated image");

    if let Some(path) = &args.json {
        detection::io_json::write_json(path, &result)?;
        info!(path = %path.display(), "wrote result JSON");
    }

    match args.report.as_str() {
        "json" => print_json(&result),
        _ => {
            print!("{}", result.statistics);
            if args.summary {
                println!();
                print!(
                    "{}",
                    stats::DetectionSummary {
                        detections: &result.detections
                    }
                );
            }
            Ok(())
        }
    }
}

/// Config values with command-line overrides applied.
fn run_params(args: &RunArgs, config: &Config) -> PipelineParams {
    let mut params = config.params();
    if let Some(t) = args.confidence {
        params.confidence_threshold = t;
    }
    if let Some(t) = args.iou {
        params.iou_threshold = t;
    }
    if args.color_by_index {
        params.render.color_policy = ColorPolicy::ByIndexCyclic;
    }
    if let Some(t) = args.line_thickness {
        params.render.line_thickness = t;
    }
    if args.no_labels {
        params.render.show_labels = false;
    }
    if args.no_confidence {
        params.render.show_confidence = false;
    }
    params
}

fn warn_out_of_frame(raw: &[RawDetection], image: &RgbImage) {
    let outside = raw
        .iter()
        .filter(|d| d.bbox().is_outside(image.width(), image.height()))
        .count();
    if outside > 0 {
        warn!(
            count = outside,
            width = image.width(),
            height = image.height(),
            "detections lie entirely outside the image"
        );
    }
}

/// Execute the stats subcommand.
fn run_stats(args: StatsArgs, config: &Config) -> Result<(), DetpipeError> {
    check_report_format(&args.output)?;

    let raw = detection::io_json::read_detections(&args.detections)?;
    let detections = classify::assign_categories(&raw, &config.category_table());
    let statistics = stats::aggregate(&detections);

    match args.output.as_str() {
        "json" => print_json(&statistics),
        _ => {
            print!("{}", statistics);
            Ok(())
        }
    }
}

/// JSON shape of the validate report.
#[derive(Serialize)]
struct ValidateOutput<'a> {
    error_count: usize,
    warning_count: usize,
    issues: &'a [validation::ValidationIssue],
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), DetpipeError> {
    check_report_format(&args.output)?;

    let records = detection::io_json::read_detection_records(&args.detections)?;
    let image_size = match (&args.image, args.width, args.height) {
        (Some(path), _, _) => Some(image::image_dimensions(path)?),
        (None, Some(w), Some(h)) => Some((w, h)),
        _ => None,
    };

    let opts = validation::ValidateOptions {
        strict: args.strict,
        image_size,
    };
    let report = validation::validate_records(&records, &opts);

    match args.output.as_str() {
        "json" => print_json(&ValidateOutput {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            issues: &report.issues,
        })?,
        _ => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(DetpipeError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the grid subcommand.
fn run_grid(args: GridArgs, config: &Config) -> Result<(), DetpipeError> {
    let images = args
        .images
        .iter()
        .map(|path| open_rgb(path))
        .collect::<Result<Vec<_>, _>>()?;

    let renderer = Renderer::new(config.font()?, Arc::new(config.category_table()));
    let grid = renderer.compose_grid(&images, &args.titles, args.columns);

    grid.save(&args.output)?;
    info!(
        path = %args.output.display(),
        images = images.len(),
        "wrote grid"
    );
    Ok(())
}

fn open_rgb(path: &Path) -> Result<RgbImage, DetpipeError> {
    Ok(image::open(path)?.to_rgb8())
}

fn check_report_format(format: &str) -> Result<(), DetpipeError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(DetpipeError::UnsupportedFormat(format!(
            "'{}' (supported: text, json)",
            other
        ))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), DetpipeError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| DetpipeError::ResultWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    Ok(())
}
