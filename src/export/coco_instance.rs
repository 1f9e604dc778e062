//! COCO instance-segmentation export.
//!
//! Bitmap datasets get one annotation per labeled instance with a
//! compressed RLE mask, its area and bounding box. Bbox datasets get the
//! box from the stored corner points only.

use std::path::PathBuf;

use serde::Serialize;

use super::coco::{write_json, CocoBbox, CocoImage, CocoInfo};
use super::{json_output_path, labeled_annotations, ExportOptions};
use super::{ExportIssue, ExportIssueCode, ExportReport};
use crate::error::ExportError;
use crate::ir::{
    AnnotationId, CategoryId, CornerBox, ImageId, InstanceAnnotation, Pixel, Sample, SampleSource,
    TaskCategory,
};
use crate::mask::rle::{self, CompressedRle};
use crate::mask::{instance_mask_column_major, regions};

#[derive(Debug, Serialize)]
struct CocoInstanceDocument<'a> {
    info: CocoInfo,
    categories: &'a [TaskCategory],
    images: Vec<CocoImage>,
    annotations: Vec<CocoInstanceAnnotation>,
}

#[derive(Debug, Serialize)]
struct CocoInstanceAnnotation {
    id: AnnotationId,
    image_id: ImageId,
    category_id: CategoryId,
    bbox: CocoBbox,
    #[serde(skip_serializing_if = "Option::is_none")]
    segmentation: Option<CompressedRle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    area: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    iscrowd: Option<u8>,
}

/// Hands out annotation ids; an id is only consumed when an annotation is
/// emitted.
struct AnnotationIds {
    next: AnnotationId,
}

impl AnnotationIds {
    fn new() -> Self {
        Self {
            next: AnnotationId::FIRST,
        }
    }

    fn take(&mut self) -> AnnotationId {
        let id = self.next;
        self.next = id.next();
        id
    }
}

pub(super) fn export<S: SampleSource + ?Sized>(
    source: &S,
    options: &ExportOptions,
    report: &mut ExportReport,
) -> Result<PathBuf, ExportError> {
    let meta = source.meta();
    let mut images = Vec::new();
    let mut annotations = Vec::new();
    let mut ids = AnnotationIds::new();

    for index in 0..source.len() {
        let sample = source.sample(index)?;
        let Some(instances) = labeled_annotations(&sample, report) else {
            continue;
        };
        let image_id = ImageId::from_index(index);

        let emitted = if meta.task_type.is_segmentation_bitmap() {
            let Some(emitted) = mask_annotations(&sample, instances, image_id, &mut ids, report)?
            else {
                continue;
            };
            emitted
        } else {
            bbox_annotations(&sample, instances, image_id, &mut ids, report)
        };

        images.push(CocoImage::for_sample(image_id, &sample));
        report.counts.samples_exported += 1;
        report.counts.annotations += emitted.len();
        annotations.extend(emitted);
    }

    let document = CocoInstanceDocument {
        info: CocoInfo::for_dataset(meta),
        categories: &meta.categories,
        images,
        annotations,
    };

    let path = json_output_path(options, meta)?;
    write_json(&path, &document)?;
    report.counts.files_written += 1;
    log::info!("wrote {}", path.display());
    Ok(path)
}

/// Returns `None` when the sample has no bitmap to analyse.
fn mask_annotations(
    sample: &Sample,
    instances: &[InstanceAnnotation],
    image_id: ImageId,
    ids: &mut AnnotationIds,
    report: &mut ExportReport,
) -> Result<Option<Vec<CocoInstanceAnnotation>>, ExportError> {
    let Some(raster) = sample.segmentation_bitmap.as_ref() else {
        report.add(ExportIssue::warning(
            ExportIssueCode::SampleMissingBitmap,
            format!("sample '{}' has no segmentation bitmap, skipped", sample.name),
        ));
        return Ok(None);
    };

    let sample_regions = regions(raster);
    let (height, width) = (raster.height() as u32, raster.width() as u32);
    let mut out = Vec::with_capacity(instances.len());

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

        let mask = instance_mask_column_major(raster, instance.id);
        let encoded = rle::encode(&mask, height, width)?;

        out.push(CocoInstanceAnnotation {
            id: ids.take(),
            image_id,
            category_id: instance.category_id,
            bbox: CocoBbox::Pixels(region.bbox_xywh()),
            segmentation: Some(encoded.compress()),
            area: Some(region.area),
            iscrowd: Some(0),
        });
    }

    Ok(Some(out))
}

fn bbox_annotations(
    sample: &Sample,
    instances: &[InstanceAnnotation],
    image_id: ImageId,
    ids: &mut AnnotationIds,
    report: &mut ExportReport,
) -> Vec<CocoInstanceAnnotation> {
    let mut out = Vec::with_capacity(instances.len());
    for instance in instances {
        let Some(bbox) = CornerBox::<Pixel>::from_points(&instance.points) else {
            report.add(ExportIssue::warning(
                ExportIssueCode::MalformedBbox,
                format!(
                    "instance {} of sample '{}' does not have two corner points, skipped",
                    instance.id, sample.name
                ),
            ));
            continue;
        };

        out.push(CocoInstanceAnnotation {
            id: ids.take(),
            image_id,
            category_id: instance.category_id,
            bbox: CocoBbox::Points(bbox.to_xywh()),
            segmentation: None,
            area: None,
            iscrowd: None,
        });
    }
    out
}
