//! YOLO bounding-box export.
//!
//! One `<image base name>.txt` per sample with at least one annotation,
//! written to the image directory. Each bbox becomes a line
//! `category_id cx cy w h`, normalized by the image size, six decimals.

use super::{labeled_annotations, write_file};
use super::{ExportIssue, ExportIssueCode, ExportReport};
use crate::error::ExportError;
use crate::ir::{AnnotationShape, CornerBox, ImageSize, InstanceAnnotation, Pixel, SampleSource, TaskType};

pub(super) fn export<S: SampleSource + ?Sized>(
    source: &S,
    report: &mut ExportReport,
) -> Result<(), ExportError> {
    let meta = source.meta();
    if meta.task_type == TaskType::Vector {
        report.add(ExportIssue::info(
            ExportIssueCode::UnsupportedGeometry,
            "only bbox annotations are exported; polygons, polylines and points are ignored",
        ));
    }

    for index in 0..source.len() {
        let sample = source.sample(index)?;
        let Some(annotations) = labeled_annotations(&sample, report) else {
            continue;
        };
        if annotations.is_empty() {
            continue;
        }
        let size = match sample.image {
            Some(size) if size.width > 0 && size.height > 0 => size,
            Some(size) => {
                report.add(ExportIssue::warning(
                    ExportIssueCode::SampleMissingImageSize,
                    format!(
                        "sample '{}' has a {}x{} image, cannot normalize, skipped",
                        sample.name, size.width, size.height
                    ),
                ));
                continue;
            }
            None => {
                report.add(ExportIssue::warning(
                    ExportIssueCode::SampleMissingImageSize,
                    format!("sample '{}' has no image size to normalize by, skipped", sample.name),
                ));
                continue;
            }
        };

        let mut lines = String::new();
        let mut written = 0;
        let mut other_geometry = 0;
        for annotation in annotations {
            if annotation.shape != AnnotationShape::Bbox {
                other_geometry += 1;
                continue;
            }
            match yolo_line(annotation, size) {
                Some(line) => {
                    lines.push_str(&line);
                    lines.push('\n');
                    written += 1;
                }
                None => report.add(ExportIssue::warning(
                    ExportIssueCode::MalformedBbox,
                    format!(
                        "bbox {} of sample '{}' does not have two corner points, skipped",
                        annotation.id, sample.name
                    ),
                )),
            }
        }

        if other_geometry > 0 {
            report.add(ExportIssue::info(
                ExportIssueCode::UnsupportedGeometry,
                format!(
                    "{} non-bbox annotation(s) of sample '{}' skipped",
                    other_geometry, sample.name
                ),
            ));
        }

        let path = meta.image_dir.join(format!("{}.txt", sample.base_name()));
        write_file(&path, lines.as_bytes(), report)?;
        report.counts.samples_exported += 1;
        report.counts.annotations += written;
    }

    log::info!("label files in {}", meta.image_dir.display());
    Ok(())
}

/// Formats one bbox annotation, `None` if it lacks two corner points.
fn yolo_line(annotation: &InstanceAnnotation, size: ImageSize) -> Option<String> {
    let bbox = CornerBox::<Pixel>::from_points(&annotation.points)?;
    let (cx, cy, w, h) = bbox
        .to_normalized(size.width as f64, size.height as f64)
        .to_cxcywh();
    Some(format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        annotation.category_id, cx, cy, w, h
    ))
}
