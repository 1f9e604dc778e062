//! Segexport: labeled-image dataset export.
//!
//! Segexport turns a segmentation or bounding-box dataset into the formats
//! computer-vision pipelines train on: COCO instance, COCO panoptic, YOLO
//! text labels, and flat instance/semantic label images.
//!
//! # Modules
//!
//! - [`ir`]: Dataset model (categories, samples, rasters) and sample sources
//! - [`color`]: Id/color packing and the panoptic color allocator
//! - [`mask`]: Instance regions and COCO run-length encoding
//! - [`packing`]: Semantic, panoptic and colorized rasters, PNG codec
//! - [`export`]: Format emitters and the export report
//! - [`error`]: Error types for segexport operations

pub mod color;
pub mod error;
pub mod export;
pub mod ir;
pub mod mask;
pub mod packing;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::ExportError;

use export::{ExportFormat, ExportOptions, ExportReport};
use ir::io_manifest;

/// The segexport CLI application.
#[derive(Parser)]
#[command(name = "segexport")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Export a dataset release described by a local manifest.
    Export(ExportArgs),
}

/// Export formats accepted on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    CocoPanoptic,
    CocoInstance,
    Yolo,
    Instance,
    InstanceColor,
    Semantic,
    SemanticColor,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::CocoPanoptic => ExportFormat::CocoPanoptic,
            FormatArg::CocoInstance => ExportFormat::CocoInstance,
            FormatArg::Yolo => ExportFormat::Yolo,
            FormatArg::Instance => ExportFormat::Instance,
            FormatArg::InstanceColor => ExportFormat::InstanceColor,
            FormatArg::Semantic => ExportFormat::Semantic,
            FormatArg::SemanticColor => ExportFormat::SemanticColor,
        }
    }
}

/// Report output formats.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum ReportArg {
    #[default]
    Text,
    Json,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Dataset manifest (JSON).
    manifest: PathBuf,

    /// Export format.
    #[arg(long, value_enum)]
    format: FormatArg,

    /// Folder for the dataset-level JSON file.
    #[arg(long, short, default_value = ".")]
    output: PathBuf,

    /// Image directory; per-sample outputs are written here. Overrides the
    /// manifest's `image_dir`.
    #[arg(long, env = "SEGEXPORT_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Offset added to category ids in semantic label images.
    #[arg(long, default_value_t = packing::DEFAULT_ID_INCREMENT)]
    id_increment: u32,

    /// Seed for panoptic color allocation (random if omitted).
    #[arg(long)]
    seed: Option<u64>,

    /// Give up after this many attempts to find a free panoptic color.
    #[arg(long)]
    max_color_attempts: Option<u64>,

    /// Output format for the export report.
    #[arg(long, value_enum, default_value_t = ReportArg::Text)]
    report: ReportArg,

    /// Exit non-zero if anything was skipped.
    #[arg(long)]
    strict: bool,
}

/// Run the segexport CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), ExportError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Export(args)) => run_export(args),
        None => {
            // No subcommand: just print help hint and exit successfully
            println!("segexport {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Labeled-image dataset export.");
            println!();
            println!("Run 'segexport --help' for usage information.");
            Ok(())
        }
    }
}

/// Machine-readable summary printed by `--report json`.
#[derive(Serialize)]
struct JsonOutput<'a> {
    json_path: Option<&'a Path>,
    output_dir: &'a Path,
    report: &'a ExportReport,
}

/// Execute the export subcommand.
fn run_export(args: ExportArgs) -> Result<(), ExportError> {
    let mut dataset = io_manifest::read_manifest(&args.manifest)?;
    if let Some(image_dir) = args.image_dir {
        dataset = dataset.with_image_dir(image_dir);
    }

    let mut options =
        ExportOptions::new(args.format.into(), args.output).with_id_increment(args.id_increment);
    if let Some(seed) = args.seed {
        options = options.with_seed(seed);
    }
    if let Some(limit) = args.max_color_attempts {
        options = options.with_max_color_attempts(limit);
    }

    let outcome = export::export_dataset(&dataset, &options)?;
    let report = &outcome.report;

    match args.report {
        ReportArg::Json => {
            let json = JsonOutput {
                json_path: outcome.json_path.as_deref(),
                output_dir: &outcome.output_dir,
                report,
            };
            let text = serde_json::to_string_pretty(&json).map_err(|source| {
                ExportError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            println!("{}", text);
        }
        ReportArg::Text => {
            print!("{}", report);
            if let Some(path) = &outcome.json_path {
                println!("  JSON: {}", path.display());
            }
            println!("  Labels: {}", outcome.output_dir.display());
        }
    }

    if args.strict && report.is_partial() {
        return Err(ExportError::ExportIncomplete {
            warning_count: report.warning_count(),
        });
    }
    Ok(())
}
