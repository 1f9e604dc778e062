//! Dataset export to COCO, YOLO and flat label images.
//!
//! [`export_dataset`] checks that the dataset's task type suits the
//! requested format, then hands the samples to one emitter. Emitters walk
//! samples in index order, build each output fully in memory and record
//! everything they skip in the returned [`ExportReport`].
//!
//! Dataset-level JSON documents go to the export folder as
//! `export_<format>_<dataset>_<release>.json`. Per-sample files go next to
//! the images, in the dataset's image directory.

pub(crate) mod coco;
mod coco_instance;
mod coco_panoptic;
mod flat_image;
pub mod report;
mod yolo;

pub use report::{ExportCounts, ExportIssue, ExportIssueCode, ExportReport, ExportSeverity};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ExportError;
use crate::ir::{DatasetMeta, InstanceAnnotation, Sample, SampleSource, TaskType};
use crate::packing::DEFAULT_ID_INCREMENT;

const SEGMENTATION_TASKS: &[TaskType] = &[
    TaskType::SegmentationBitmap,
    TaskType::SegmentationBitmapHighres,
];
const INSTANCE_TASKS: &[TaskType] = &[
    TaskType::SegmentationBitmap,
    TaskType::SegmentationBitmapHighres,
    TaskType::Bboxes,
];
const YOLO_TASKS: &[TaskType] = &[TaskType::Vector, TaskType::Bboxes];

/// Export target format.
///
/// This mirrors the CLI's format argument but is decoupled from clap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    CocoPanoptic,
    CocoInstance,
    Yolo,
    /// Instance raster packed into RGBA.
    Instance,
    /// Instance raster colorized with the built-in palette.
    InstanceColor,
    /// Category raster as grayscale.
    Semantic,
    /// Category raster colorized with the category colors.
    SemanticColor,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 7] = [
        ExportFormat::CocoPanoptic,
        ExportFormat::CocoInstance,
        ExportFormat::Yolo,
        ExportFormat::Instance,
        ExportFormat::InstanceColor,
        ExportFormat::Semantic,
        ExportFormat::SemanticColor,
    ];

    /// Name used on the command line and in output file names.
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::CocoPanoptic => "coco-panoptic",
            ExportFormat::CocoInstance => "coco-instance",
            ExportFormat::Yolo => "yolo",
            ExportFormat::Instance => "instance",
            ExportFormat::InstanceColor => "instance-color",
            ExportFormat::Semantic => "semantic",
            ExportFormat::SemanticColor => "semantic-color",
        }
    }

    /// Task types this format can be produced from.
    pub fn supported_task_types(&self) -> &'static [TaskType] {
        match self {
            ExportFormat::CocoInstance => INSTANCE_TASKS,
            ExportFormat::Yolo => YOLO_TASKS,
            ExportFormat::CocoPanoptic
            | ExportFormat::Instance
            | ExportFormat::InstanceColor
            | ExportFormat::Semantic
            | ExportFormat::SemanticColor => SEGMENTATION_TASKS,
        }
    }

    /// Fails with [`ExportError::IncompatibleTaskType`] if `task_type` is
    /// not supported.
    pub fn check_task_type(&self, task_type: TaskType) -> Result<(), ExportError> {
        let supported = self.supported_task_types();
        if supported.contains(&task_type) {
            return Ok(());
        }
        Err(ExportError::IncompatibleTaskType {
            format: self.name().to_string(),
            task_type,
            supported: supported
                .iter()
                .map(TaskType::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ExportFormat::ALL.iter().map(|f| f.name()).collect();
                ExportError::UnsupportedFormat(format!(
                    "'{}' (supported: {})",
                    s,
                    names.join(", ")
                ))
            })
    }
}

/// Options for one export run.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub format: ExportFormat,

    /// Folder receiving the dataset-level JSON document.
    pub export_folder: PathBuf,

    /// Added to category ids in semantic rasters.
    pub id_increment: u32,

    /// Seed for the panoptic color allocator; random when `None`.
    pub seed: Option<u64>,

    /// Perturbation attempts per panoptic color before giving up; unbounded
    /// when `None`.
    pub max_color_attempts: Option<u64>,
}

impl ExportOptions {
    pub fn new(format: ExportFormat, export_folder: impl Into<PathBuf>) -> Self {
        Self {
            format,
            export_folder: export_folder.into(),
            id_increment: DEFAULT_ID_INCREMENT,
            seed: None,
            max_color_attempts: None,
        }
    }

    pub fn with_id_increment(mut self, id_increment: u32) -> Self {
        self.id_increment = id_increment;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_color_attempts(mut self, max_attempts: u64) -> Self {
        self.max_color_attempts = Some(max_attempts);
        self
    }
}

/// What an export run produced.
#[derive(Clone, Debug)]
pub struct ExportOutcome {
    /// The dataset-level JSON document, for the COCO formats.
    pub json_path: Option<PathBuf>,

    /// Directory holding the per-sample outputs.
    pub output_dir: PathBuf,

    pub report: ExportReport,
}

/// Exports every sample of `source` in the requested format.
///
/// # Errors
/// Fails before touching the file system if the task type does not suit
/// the format. Afterwards, only I/O, decoding and color allocation errors
/// abort the run; per-sample problems are recorded in the report.
pub fn export_dataset<S: SampleSource + ?Sized>(
    source: &S,
    options: &ExportOptions,
) -> Result<ExportOutcome, ExportError> {
    let meta = source.meta();
    options.format.check_task_type(meta.task_type)?;

    let mut report = ExportReport::new(options.format.name(), &meta.identifier, &meta.release);
    report.counts.samples = source.len();

    fs::create_dir_all(&meta.image_dir).map_err(ExportError::Io)?;

    let json_path = match options.format {
        ExportFormat::CocoInstance => Some(coco_instance::export(source, options, &mut report)?),
        ExportFormat::CocoPanoptic => Some(coco_panoptic::export(source, options, &mut report)?),
        ExportFormat::Yolo => {
            yolo::export(source, &mut report)?;
            None
        }
        ExportFormat::Instance
        | ExportFormat::InstanceColor
        | ExportFormat::Semantic
        | ExportFormat::SemanticColor => {
            flat_image::export(source, options, &mut report)?;
            None
        }
    };

    log::info!(
        "exported {} of {} samples as {}",
        report.counts.samples_exported,
        report.counts.samples,
        options.format
    );

    Ok(ExportOutcome {
        json_path,
        output_dir: meta.image_dir.clone(),
        report,
    })
}

/// `<export_folder>/export_<format>_<dataset>_<release>.json`, with the
/// folder created if needed.
pub(crate) fn json_output_path(
    options: &ExportOptions,
    meta: &DatasetMeta,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(&options.export_folder).map_err(ExportError::Io)?;
    Ok(options.export_folder.join(format!(
        "export_{}_{}_{}.json",
        options.format.name(),
        meta.file_safe_identifier(),
        meta.release
    )))
}

/// `<image_dir>/<base>_label_<labelset>_<variant>.png`
pub(crate) fn label_image_path(meta: &DatasetMeta, sample: &Sample, variant: &str) -> PathBuf {
    meta.image_dir.join(format!(
        "{}_label_{}_{}.png",
        sample.base_name(),
        meta.labelset,
        variant
    ))
}

/// The sample's annotations, or `None` after recording that it is
/// unlabeled.
pub(crate) fn labeled_annotations<'s>(
    sample: &'s Sample,
    report: &mut ExportReport,
) -> Option<&'s [InstanceAnnotation]> {
    match sample.annotations.as_deref() {
        Some(annotations) => Some(annotations),
        None => {
            report.add(ExportIssue::warning(
                ExportIssueCode::SampleNotLabeled,
                format!("sample '{}' has no label, skipped", sample.name),
            ));
            None
        }
    }
}

/// Writes bytes that are already fully built.
pub(crate) fn write_file(
    path: &Path,
    bytes: &[u8],
    report: &mut ExportReport,
) -> Result<(), ExportError> {
    fs::write(path, bytes).map_err(ExportError::Io)?;
    report.counts.files_written += 1;
    Ok(())
}
