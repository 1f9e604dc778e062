//! Per-sample label images: instance, semantic, and their colorized
//! previews.

use super::{label_image_path, labeled_annotations, write_file, ExportFormat, ExportOptions};
use super::{ExportIssue, ExportIssueCode, ExportReport};
use crate::color::Rgb;
use crate::error::ExportError;
use crate::ir::{resolve_categories, LabelRaster, Sample, SampleSource};
use crate::packing::png::{encode_gray16_png, encode_png};
use crate::packing::{colorize, pack_bitmap, semantic_bitmap, to_gray8};

fn variant(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::InstanceColor => "instance_colored",
        ExportFormat::Semantic => "semantic",
        ExportFormat::SemanticColor => "semantic_colored",
        _ => "instance",
    }
}

pub(super) fn export<S: SampleSource + ?Sized>(
    source: &S,
    options: &ExportOptions,
    report: &mut ExportReport,
) -> Result<(), ExportError> {
    let meta = source.meta();
    let colormap: Vec<Rgb> = resolve_categories(&meta.categories)
        .iter()
        .map(|category| category.color)
        .collect();

    for index in 0..source.len() {
        let sample = source.sample(index)?;
        let Some(annotations) = labeled_annotations(&sample, report) else {
            continue;
        };
        let Some(raster) = sample.segmentation_bitmap.as_ref() else {
            report.add(ExportIssue::warning(
                ExportIssueCode::SampleMissingBitmap,
                format!("sample '{}' has no segmentation bitmap, skipped", sample.name),
            ));
            continue;
        };

        let png = match options.format {
            ExportFormat::InstanceColor => encode_png(&colorize(raster, None))?,
            ExportFormat::Semantic => {
                let semantic = semantic_bitmap(raster, annotations, options.id_increment);
                encode_semantic(&semantic, &sample, report)?
            }
            ExportFormat::SemanticColor => {
                let semantic = semantic_bitmap(raster, annotations, options.id_increment);
                encode_png(&colorize(&semantic, Some(&colormap)))?
            }
            _ => encode_png(&pack_bitmap(raster))?,
        };

        let path = label_image_path(meta, &sample, variant(options.format));
        write_file(&path, &png, report)?;
        report.counts.samples_exported += 1;
        report.counts.annotations += annotations.len();
    }

    log::info!("label images in {}", meta.image_dir.display());
    Ok(())
}

/// 8-bit gray when every value fits, 16-bit gray otherwise.
fn encode_semantic(
    semantic: &LabelRaster,
    sample: &Sample,
    report: &mut ExportReport,
) -> Result<Vec<u8>, ExportError> {
    if let Some(gray) = to_gray8(semantic) {
        return encode_png(&gray);
    }
    report.add(ExportIssue::warning(
        ExportIssueCode::SemanticWidenedTo16Bit,
        format!(
            "semantic label of sample '{}' has values up to {}, written as 16-bit gray",
            sample.name,
            semantic.max_value()
        ),
    ));
    encode_gray16_png(semantic)
}
