//! Local dataset manifests.
//!
//! A manifest is a JSON file describing one release of a dataset whose
//! images and label bitmaps are already on disk:
//!
//! ```json
//! {
//!   "dataset": {
//!     "identifier": "jane/street-scenes",
//!     "name": "street-scenes",
//!     "task_type": "segmentation-bitmap",
//!     "categories": [{"id": 1, "name": "car", "has_instances": true}]
//!   },
//!   "release": "v1.0",
//!   "labelset": "ground-truth",
//!   "image_dir": "images",
//!   "samples": [
//!     {
//!       "name": "frame_0001.jpg",
//!       "image": {"width": 640, "height": 480},
//!       "segmentation_bitmap": "labels/frame_0001.png",
//!       "annotations": [{"id": 1, "category_id": 1}]
//!     }
//!   ]
//! }
//! ```
//!
//! Relative paths resolve against the manifest's directory. Label bitmaps
//! are packed RGBA PNGs (8-bit gray is accepted and upcast) and are only
//! decoded when the sample is requested.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::model::{DatasetMeta, ImageSize, InstanceAnnotation, Sample, TaskCategory, TaskType};
use super::source::SampleSource;
use crate::error::ExportError;
use crate::packing::png::read_label_png;

const DEFAULT_LABELSET: &str = "ground-truth";

/// On-disk manifest document.
#[derive(Clone, Debug, Deserialize)]
pub struct Manifest {
    pub dataset: ManifestDatasetInfo,
    pub release: String,
    #[serde(default = "default_labelset")]
    pub labelset: String,
    #[serde(default)]
    pub image_dir: Option<PathBuf>,
    #[serde(default)]
    pub samples: Vec<ManifestSample>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ManifestDatasetInfo {
    pub identifier: String,
    /// Falls back to the last segment of `identifier`.
    #[serde(default)]
    pub name: Option<String>,
    pub task_type: TaskType,
    #[serde(default)]
    pub categories: Vec<TaskCategory>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ManifestSample {
    pub name: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub image: Option<ImageSize>,
    /// Path to the packed label PNG.
    #[serde(default)]
    pub segmentation_bitmap: Option<PathBuf>,
    /// `null` (or absent) when the sample is unlabeled.
    #[serde(default)]
    pub annotations: Option<Vec<InstanceAnnotation>>,
}

fn default_labelset() -> String {
    DEFAULT_LABELSET.to_string()
}

/// A dataset backed by a manifest on local disk.
#[derive(Clone, Debug)]
pub struct ManifestDataset {
    meta: DatasetMeta,
    base_dir: PathBuf,
    samples: Vec<ManifestSample>,
}

impl ManifestDataset {
    /// Builds a dataset from a parsed manifest whose relative paths resolve
    /// against `base_dir`.
    pub fn from_manifest(manifest: Manifest, base_dir: &Path) -> Self {
        let image_dir = match manifest.image_dir {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };
        let name = manifest.dataset.name.unwrap_or_else(|| {
            manifest
                .dataset
                .identifier
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        });

        let meta = DatasetMeta {
            identifier: manifest.dataset.identifier,
            name,
            release: manifest.release,
            labelset: manifest.labelset,
            task_type: manifest.dataset.task_type,
            categories: manifest.dataset.categories,
            image_dir,
        };

        Self {
            meta,
            base_dir: base_dir.to_path_buf(),
            samples: manifest.samples,
        }
    }

    /// Replaces the directory images are read from and per-sample outputs
    /// are written to.
    pub fn with_image_dir(mut self, image_dir: impl Into<PathBuf>) -> Self {
        self.meta.image_dir = image_dir.into();
        self
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn probe_image_size(&self, name: &str) -> Option<ImageSize> {
        let path = self.meta.image_dir.join(name);
        if !path.is_file() {
            return None;
        }
        match imagesize::size(&path) {
            Ok(size) => Some(ImageSize {
                width: size.width as u32,
                height: size.height as u32,
            }),
            Err(err) => {
                log::warn!("could not read image size of {}: {}", path.display(), err);
                None
            }
        }
    }
}

impl SampleSource for ManifestDataset {
    fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn sample(&self, index: usize) -> Result<Sample, ExportError> {
        let entry = self
            .samples
            .get(index)
            .ok_or(ExportError::SampleOutOfRange {
                index,
                len: self.samples.len(),
            })?;

        let segmentation_bitmap = match &entry.segmentation_bitmap {
            Some(path) => Some(read_label_png(&self.resolve(path))?),
            None => None,
        };
        let image = entry
            .image
            .or_else(|| self.probe_image_size(&entry.name));

        Ok(Sample {
            name: entry.name.clone(),
            file_name: entry.file_name.clone().unwrap_or_else(|| entry.name.clone()),
            image,
            segmentation_bitmap,
            annotations: entry.annotations.clone(),
        })
    }
}

/// Reads a manifest file into a dataset.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_manifest(path: &Path) -> Result<ManifestDataset, ExportError> {
    let file = File::open(path).map_err(ExportError::Io)?;
    let reader = BufReader::new(file);

    let manifest: Manifest =
        serde_json::from_reader(reader).map_err(|source| ExportError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(ManifestDataset::from_manifest(manifest, base_dir))
}

/// Parses a manifest from a JSON string.
///
/// Useful for testing without file I/O.
pub fn from_manifest_str(json: &str) -> Result<Manifest, serde_json::Error> {
    serde_json::from_str(json)
}

/// Parses a manifest from a JSON byte slice.
///
/// Useful for fuzzing and processing raw bytes without UTF-8 validation overhead.
pub fn from_manifest_slice(bytes: &[u8]) -> Result<Manifest, serde_json::Error> {
    serde_json::from_slice(bytes)
}
