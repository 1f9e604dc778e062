use std::path::PathBuf;
use thiserror::Error;

use crate::ir::{CategoryId, TaskType};

/// The main error type for segexport operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse dataset manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Task type '{task_type}' cannot be exported to {format} (supported task types: {supported})"
    )]
    IncompatibleTaskType {
        format: String,
        task_type: TaskType,
        supported: String,
    },

    #[error("Unknown category id {0}")]
    UnknownCategory(CategoryId),

    #[error("No free color found for category {category_id} after {attempts} attempt(s)")]
    ColorSpaceExhausted {
        category_id: CategoryId,
        attempts: u64,
    },

    #[error("Failed to encode PNG: {0}")]
    PngEncode(String),

    #[error("Failed to decode PNG: {0}")]
    PngDecode(String),

    #[error("Failed to read label bitmap {path}: {message}")]
    BitmapRead { path: PathBuf, message: String },

    #[error("Sample index {index} out of range for {len} sample(s)")]
    SampleOutOfRange { index: usize, len: usize },

    #[error("Invalid label raster: {0}")]
    InvalidRaster(String),

    #[error("Invalid RLE: {0}")]
    InvalidRle(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Export incomplete: {warning_count} warning(s)")]
    ExportIncomplete { warning_count: usize },
}
