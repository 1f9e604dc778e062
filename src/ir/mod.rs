//! In-memory model of a labeled image dataset.
//!
//! Everything the exporters read lives here: the dataset metadata and
//! category records, the per-sample instance rasters and annotations,
//! and the [`SampleSource`] trait that hands samples out in order.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Newtype ids and coordinate-space markers keep
//!    category ids, instance ids and output ids apart at compile time.
//!
//! 2. **Raw and resolved categories**: [`TaskCategory`] keeps the record
//!    as stored; [`Category`] is the resolved form the color allocator uses.
//!
//! 3. **Lazy samples**: Sources load one sample at a time, so a release
//!    never has to fit in memory.
//!
//! # Example
//!
//! ```
//! use segexport::ir::{
//!     DatasetMeta, InMemoryDataset, InstanceAnnotation, LabelRaster, Sample, SampleSource,
//!     TaskCategory, TaskType,
//! };
//!
//! let meta = DatasetMeta {
//!     identifier: "jane/cats".into(),
//!     name: "cats".into(),
//!     release: "v1".into(),
//!     labelset: "ground-truth".into(),
//!     task_type: TaskType::SegmentationBitmap,
//!     categories: vec![TaskCategory::new(1, "cat").with_instances(true)],
//!     image_dir: "images".into(),
//! };
//! let raster = LabelRaster::from_rows(&[vec![0, 1], vec![1, 1]]).unwrap();
//! let sample = Sample::new("cat.jpg")
//!     .with_image_size(2, 2)
//!     .with_bitmap(raster)
//!     .with_annotations(vec![InstanceAnnotation::mask(1, 1)]);
//!
//! let dataset = InMemoryDataset::new(meta, vec![sample]);
//! assert_eq!(dataset.len(), 1);
//! ```

mod bbox;
mod ids;
pub mod io_manifest;
mod model;
mod raster;
mod source;

// Re-export core types for convenient access
pub use bbox::{CornerBox, Normalized, Pixel};
pub use ids::{AnnotationId, CategoryId, ImageId, InstanceId};
pub use model::{
    resolve_categories, AnnotationShape, Category, DatasetMeta, ImageSize, InstanceAnnotation,
    Sample, TaskCategory, TaskType,
};
pub use raster::{GrayImage, LabelRaster, PixelImage, RgbImage, RgbaImage};
pub use source::{InMemoryDataset, SampleSource};
