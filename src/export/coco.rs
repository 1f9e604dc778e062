//! COCO schema types shared by the instance and panoptic emitters.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::ExportError;
use crate::ir::{DatasetMeta, ImageId, Sample};

/// COCO dataset info block.
#[derive(Debug, Serialize)]
pub(crate) struct CocoInfo {
    pub description: String,
    pub version: String,
}

impl CocoInfo {
    pub fn for_dataset(meta: &DatasetMeta) -> Self {
        Self {
            description: meta.name.clone(),
            version: meta.release.clone(),
        }
    }
}

/// COCO image entry. Width and height are `null` when the image size is
/// unknown.
#[derive(Debug, Serialize)]
pub(crate) struct CocoImage {
    pub id: ImageId,
    pub file_name: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
}

impl CocoImage {
    pub fn for_sample(id: ImageId, sample: &Sample) -> Self {
        Self {
            id,
            file_name: sample.file_name.clone(),
            height: sample.image.map(|size| size.height),
            width: sample.image.map(|size| size.width),
        }
    }
}

/// COCO bbox `[x, y, width, height]`.
///
/// Raster-derived boxes are whole pixels; boxes from stored corner points
/// keep their fractional coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub(crate) enum CocoBbox {
    Pixels([u64; 4]),
    Points([f64; 4]),
}

/// Serializes `value` fully in memory, then writes it to `path`.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let bytes = serde_json::to_vec(value).map_err(|source| ExportError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, bytes).map_err(ExportError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_serializes_without_tag() {
        let pixels = serde_json::to_value(CocoBbox::Pixels([1, 2, 3, 4])).unwrap();
        assert_eq!(pixels, serde_json::json!([1, 2, 3, 4]));
        assert!(pixels[0].is_u64());

        let points = serde_json::to_value(CocoBbox::Points([1.5, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(points[0], 1.5);
    }

    #[test]
    fn image_without_size_has_null_dimensions() {
        let image = CocoImage::for_sample(ImageId(3), &Sample::new("a.jpg"));
        let json = serde_json::to_value(image).unwrap();
        assert_eq!(json["id"], 3);
        assert!(json["width"].is_null());
        assert!(json["height"].is_null());
    }
}
