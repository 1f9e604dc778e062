//! COCO panoptic export.
//!
//! Each labeled sample becomes one RGB label PNG in which every instance is
//! painted with a color from a single export-wide [`IdGenerator`], plus a
//! `segments_info` entry keyed by the id packed in that color.

use std::path::PathBuf;

use serde::Serialize;

use super::coco::{write_json, CocoImage, CocoInfo};
use super::{json_output_path, label_image_path, labeled_annotations, write_file, ExportOptions};
use super::{ExportIssue, ExportIssueCode, ExportReport};
use crate::color::{IdGenerator, Rgb};
use crate::error::ExportError;
use crate::ir::{resolve_categories, Category, CategoryId, ImageId, InstanceId, SampleSource};
use crate::mask::regions;
use crate::packing::{panoptic_composite, png::encode_png};

const VARIANT: &str = "coco-panoptic";

#[derive(Debug, Serialize)]
struct CocoPanopticDocument {
    info: CocoInfo,
    categories: Vec<PanopticCategory>,
    images: Vec<CocoImage>,
    annotations: Vec<PanopticAnnotation>,
}

#[derive(Debug, Serialize)]
struct PanopticCategory {
    id: CategoryId,
    name: String,
    color: Rgb,
    isthing: u8,
}

impl From<&Category> for PanopticCategory {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color,
            isthing: u8::from(category.isthing),
        }
    }
}

#[derive(Debug, Serialize)]
struct PanopticAnnotation {
    segments_info: Vec<SegmentInfo>,
    file_name: String,
    image_id: ImageId,
}

#[derive(Debug, Serialize)]
struct SegmentInfo {
    /// Id packed into the segment's color.
    id: u32,
    category_id: CategoryId,
    bbox: [u64; 4],
    area: u64,
    iscrowd: u8,
}

fn id_generator(categories: &[Category], options: &ExportOptions) -> IdGenerator {
    let categories = categories.iter().cloned();
    let generator = match options.seed {
        Some(seed) => IdGenerator::with_seed(categories, seed),
        None => IdGenerator::new(categories),
    };
    match options.max_color_attempts {
        Some(limit) => generator.with_max_attempts(limit),
        None => generator,
    }
}

pub(super) fn export<S: SampleSource + ?Sized>(
    source: &S,
    options: &ExportOptions,
    report: &mut ExportReport,
) -> Result<PathBuf, ExportError> {
    let meta = source.meta();
    let categories = resolve_categories(&meta.categories);
    let mut generator = id_generator(&categories, options);

    let mut images = Vec::new();
    let mut annotations = Vec::new();

    for index in 0..source.len() {
        let sample = source.sample(index)?;
        let Some(instances) = labeled_annotations(&sample, report) else {
            continue;
        };
        let Some(raster) = sample.segmentation_bitmap.as_ref() else {
            report.add(ExportIssue::warning(
                ExportIssueCode::SampleMissingBitmap,
                format!("sample '{}' has no segmentation bitmap, skipped", sample.name),
            ));
            continue;
        };

        let image_id = ImageId::from_index(index);
        let sample_regions = regions(raster);
        let mut colors: Vec<(InstanceId, Rgb)> = Vec::with_capacity(instances.len());
        let mut segments_info = Vec::with_capacity(instances.len());

        for instance in instances {
            let Some(region) = sample_regions.get(instance.id) else {
                report.add(ExportIssue::warning(
                    ExportIssueCode::InstanceNotInBitmap,
                    format!(
                        "instance {} (category {}) of sample '{}' has no labeled pixels, skipped",
                        instance.id, instance.category_id, sample.name
                    ),
                ));
                continue;
            };

            let (segment_id, color) = generator.get_id_and_color(instance.category_id)?;
            colors.push((instance.id, color));
            segments_info.push(SegmentInfo {
                id: segment_id,
                category_id: instance.category_id,
                bbox: region.bbox_xywh(),
                area: region.area,
                iscrowd: 0,
            });
        }

        let unannotated = sample_regions
            .iter()
            .filter(|region| !instances.iter().any(|ann| ann.id.as_u32() == region.label))
            .count();
        if unannotated > 0 {
            report.add(ExportIssue::info(
                ExportIssueCode::UnannotatedPixels,
                format!(
                    "sample '{}' has {} raster id(s) without an annotation, left black",
                    sample.name, unannotated
                ),
            ));
        }

        let label_path = label_image_path(meta, &sample, VARIANT);
        let png = encode_png(&panoptic_composite(raster, &colors))?;
        write_file(&label_path, &png, report)?;

        let file_name = label_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        report.counts.samples_exported += 1;
        report.counts.annotations += segments_info.len();
        images.push(CocoImage::for_sample(image_id, &sample));
        annotations.push(PanopticAnnotation {
            segments_info,
            file_name,
            image_id,
        });
    }

    let document = CocoPanopticDocument {
        info: CocoInfo::for_dataset(meta),
        categories: categories.iter().map(PanopticCategory::from).collect(),
        images,
        annotations,
    };

    let path = json_output_path(options, meta)?;
    write_json(&path, &document)?;
    report.counts.files_written += 1;
    log::info!(
        "wrote {}, label images in {}",
        path.display(),
        meta.image_dir.display()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;

    #[test]
    fn panoptic_category_isthing_is_numeric() {
        let category = Category::new(2u32, "car", [0, 0, 142], true);
        let json = serde_json::to_value(PanopticCategory::from(&category)).unwrap();
        assert_eq!(json["isthing"], 1);
        assert_eq!(json["color"], serde_json::json!([0, 0, 142]));
    }

    #[test]
    fn generator_honours_options() {
        let categories = vec![Category::new(1u32, "dark", [0, 0, 0], true)];
        let options = ExportOptions::new(ExportFormat::CocoPanoptic, "out")
            .with_seed(1)
            .with_max_color_attempts(0);
        let mut generator = id_generator(&categories, &options);
        assert!(matches!(
            generator.get_color(CategoryId(1)),
            Err(ExportError::ColorSpaceExhausted { .. })
        ));
    }
}
