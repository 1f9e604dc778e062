//! Core dataset model consumed by the exporters.
//!
//! A dataset is a list of categories plus an ordered sequence of samples.
//! Each sample carries its instance raster (for bitmap task types) and the
//! annotations that give every raster value a category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::ids::{CategoryId, InstanceId};
use super::raster::LabelRaster;
use crate::color::{palette_color, Rgb};

/// The labeling task a dataset was annotated for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    SegmentationBitmap,
    SegmentationBitmapHighres,
    ImageVectorSequence,
    Bboxes,
    Vector,
    PointcloudCuboid,
    PointcloudCuboidSequence,
    PointcloudSegmentation,
    PointcloudSegmentationSequence,
    TextNamedEntities,
    TextSpanCategorization,
    #[serde(other)]
    Unknown,
}

impl TaskType {
    /// The task type's name as it appears in dataset manifests.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::SegmentationBitmap => "segmentation-bitmap",
            TaskType::SegmentationBitmapHighres => "segmentation-bitmap-highres",
            TaskType::ImageVectorSequence => "image-vector-sequence",
            TaskType::Bboxes => "bboxes",
            TaskType::Vector => "vector",
            TaskType::PointcloudCuboid => "pointcloud-cuboid",
            TaskType::PointcloudCuboidSequence => "pointcloud-cuboid-sequence",
            TaskType::PointcloudSegmentation => "pointcloud-segmentation",
            TaskType::PointcloudSegmentationSequence => "pointcloud-segmentation-sequence",
            TaskType::TextNamedEntities => "text-named-entities",
            TaskType::TextSpanCategorization => "text-span-categorization",
            TaskType::Unknown => "unknown",
        }
    }

    /// True for the task types that produce per-pixel instance rasters.
    pub fn is_segmentation_bitmap(&self) -> bool {
        matches!(
            self,
            TaskType::SegmentationBitmap | TaskType::SegmentationBitmapHighres
        )
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category record as the dataset stores it.
///
/// Only `id` and `name` are required. Unknown keys are kept in `extra` so
/// the record can be written back out unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskCategory {
    pub id: CategoryId,
    pub name: String,

    /// RGB or RGBA color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<u8>>,

    /// Whether objects of this category are counted as separate instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_instances: Option<bool>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl TaskCategory {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            has_instances: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = Some(color.to_vec());
        self
    }

    pub fn with_instances(mut self, has_instances: bool) -> Self {
        self.has_instances = Some(has_instances);
        self
    }
}

/// A category resolved for color allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: Rgb,
    /// `false` for stuff classes whose color is fixed.
    pub isthing: bool,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, color: Rgb, isthing: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            isthing,
        }
    }

    /// Resolves a stored category record found at `index` in the
    /// dataset's category list.
    ///
    /// A missing (or too short) color falls back to the built-in palette
    /// entry for `index`; a missing `has_instances` means stuff.
    pub fn resolve(index: usize, record: &TaskCategory) -> Self {
        let color = match record.color.as_deref() {
            Some([r, g, b, ..]) => [*r, *g, *b],
            _ => palette_color(index),
        };
        Self {
            id: record.id,
            name: record.name.clone(),
            color,
            isthing: record.has_instances.unwrap_or(false),
        }
    }
}

/// Resolves every category record of a dataset, in order.
pub fn resolve_categories(records: &[TaskCategory]) -> Vec<Category> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| Category::resolve(index, record))
        .collect()
}

/// The geometry kind of an annotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationShape {
    /// Pixels in the sample's instance raster.
    #[default]
    Mask,
    Bbox,
    Polygon,
    Polyline,
    Point,
}

/// One labeled object in a sample.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceAnnotation {
    /// Raster value for mask annotations.
    pub id: InstanceId,
    pub category_id: CategoryId,

    #[serde(rename = "type", default)]
    pub shape: AnnotationShape,

    /// Vertex list for vector shapes; two corners for a bbox.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Vec<f64>>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl InstanceAnnotation {
    /// A mask annotation tying raster value `id` to a category.
    pub fn mask(id: impl Into<InstanceId>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            shape: AnnotationShape::Mask,
            points: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// A bbox annotation from two corner points.
    pub fn bbox(
        id: impl Into<InstanceId>,
        category_id: impl Into<CategoryId>,
        corner0: [f64; 2],
        corner1: [f64; 2],
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            shape: AnnotationShape::Bbox,
            points: vec![corner0.to_vec(), corner1.to_vec()],
            attributes: BTreeMap::new(),
        }
    }

    /// A vector annotation of an arbitrary shape.
    pub fn vector(
        id: impl Into<InstanceId>,
        category_id: impl Into<CategoryId>,
        shape: AnnotationShape,
        points: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            shape,
            points,
            attributes: BTreeMap::new(),
        }
    }
}

/// Pixel dimensions of a sample's image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// One dataset sample, fully loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Sample name, usually the image's file name.
    pub name: String,

    /// Image file name as written into COCO documents.
    pub file_name: String,

    pub image: Option<ImageSize>,

    pub segmentation_bitmap: Option<LabelRaster>,

    /// `None` when the sample has no label at all.
    pub annotations: Option<Vec<InstanceAnnotation>>,
}

impl Sample {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            file_name: name.clone(),
            name,
            image: None,
            segmentation_bitmap: None,
            annotations: None,
        }
    }

    pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
        self.image = Some(ImageSize { width, height });
        self
    }

    pub fn with_bitmap(mut self, bitmap: LabelRaster) -> Self {
        self.segmentation_bitmap = Some(bitmap);
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<InstanceAnnotation>) -> Self {
        self.annotations = Some(annotations);
        self
    }

    /// The sample name without directories or extension, used to name
    /// per-sample output files.
    pub fn base_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }
}

/// Dataset-level metadata shared by every sample.
#[derive(Clone, Debug)]
pub struct DatasetMeta {
    /// `owner/name` identifier used in export file names.
    pub identifier: String,

    /// Human-readable dataset name.
    pub name: String,

    /// Release name, used as the COCO `version`.
    pub release: String,

    pub labelset: String,

    pub task_type: TaskType,

    pub categories: Vec<TaskCategory>,

    /// Directory holding the images; per-sample outputs are written here.
    pub image_dir: PathBuf,
}

impl DatasetMeta {
    /// The identifier with path separators replaced, safe to embed in a
    /// file name.
    pub fn file_safe_identifier(&self) -> String {
        self.identifier.replace(['/', '\\'], "_")
    }
}
