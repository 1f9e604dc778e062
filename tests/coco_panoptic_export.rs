mod common;

use std::collections::HashSet;

use common::{block_raster, dataset, fill, mask, read_json};
use segexport::color::{palette_color, rgb_to_id};
use segexport::export::{export_dataset, ExportFormat, ExportIssueCode, ExportOptions};
use segexport::ir::{LabelRaster, Sample, TaskCategory, TaskType};
use segexport::packing::png::read_label_png;
use segexport::ExportError;

const CAR: [u8; 3] = [0, 0, 142];
const ROAD: [u8; 3] = [128, 64, 128];

fn categories() -> Vec<TaskCategory> {
    vec![
        TaskCategory::new(1, "car").with_color(CAR).with_instances(true),
        TaskCategory::new(2, "road").with_color(ROAD).with_instances(false),
        TaskCategory::new(3, "person").with_instances(true),
    ]
}

fn street_raster() -> LabelRaster {
    // Two cars (1, 2) on a road (3); 5 is unannotated.
    let mut raster = LabelRaster::zeros(6, 4);
    fill(&mut raster, 2..4, 0..6, 3);
    fill(&mut raster, 0..2, 0..2, 1);
    fill(&mut raster, 0..2, 3..5, 2);
    raster.set(0, 5, 5);
    raster
}

#[test]
fn writes_composite_png_and_segments_info() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let sample = Sample::new("street.jpg")
        .with_image_size(6, 4)
        .with_bitmap(street_raster())
        .with_annotations(vec![mask(1, 1), mask(2, 1), mask(3, 2), mask(7, 3)]);
    let dataset = dataset(
        TaskType::SegmentationBitmap,
        categories(),
        images.path(),
        vec![sample],
    );
    let options = ExportOptions::new(ExportFormat::CocoPanoptic, out.path()).with_seed(7);
    let outcome = export_dataset(&dataset, &options).unwrap();

    let json_path = outcome.json_path.unwrap();
    assert_eq!(
        json_path.file_name().unwrap(),
        "export_coco-panoptic_jane_street-scenes_v1.0.json"
    );
    let doc = read_json(&json_path);

    let cats = doc["categories"].as_array().unwrap();
    assert_eq!(cats[0]["isthing"], 1);
    assert_eq!(cats[1]["isthing"], 0);
    assert_eq!(cats[1]["color"], serde_json::json!(ROAD));
    // No color stored: palette entry for the category's position.
    assert_eq!(cats[2]["color"], serde_json::json!(palette_color(2)));

    let ann = &doc["annotations"][0];
    assert_eq!(ann["image_id"], 1);
    assert_eq!(ann["file_name"], "street_label_ground-truth_coco-panoptic.png");

    let segments = ann["segments_info"].as_array().unwrap();
    assert_eq!(segments.len(), 3);

    // First car gets the base color, the road its fixed color.
    assert_eq!(segments[0]["id"], rgb_to_id(CAR));
    assert_eq!(segments[0]["bbox"], serde_json::json!([0, 0, 2, 2]));
    assert_eq!(segments[0]["area"], 4);
    assert_ne!(segments[1]["id"], segments[0]["id"]);
    assert_eq!(segments[2]["id"], rgb_to_id(ROAD));
    assert_eq!(segments[2]["category_id"], 2);
    assert_eq!(segments[2]["area"], 12);
    assert_eq!(segments[2]["iscrowd"], 0);

    // Every pixel of the composite carries its segment's id.
    let composite = read_label_png(&images.path().join(ann["file_name"].as_str().unwrap())).unwrap();
    assert_eq!(composite.get(0, 0) as u64, segments[0]["id"].as_u64().unwrap());
    assert_eq!(composite.get(1, 4) as u64, segments[1]["id"].as_u64().unwrap());
    assert_eq!(composite.get(3, 5) as u64, segments[2]["id"].as_u64().unwrap());
    assert_eq!(composite.get(0, 5), 0, "unannotated instance stays black");
    assert_eq!(composite.get(0, 2), 0);

    let report = &outcome.report;
    assert_eq!(report.count_code(ExportIssueCode::InstanceNotInBitmap), 1);
    assert_eq!(report.count_code(ExportIssueCode::UnannotatedPixels), 1);
    assert!(report.is_partial());
    assert_eq!(report.counts.files_written, 2);
    assert_eq!(report.counts.annotations, 3);
}

#[test]
fn thing_colors_are_unique_across_samples() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let samples: Vec<Sample> = (0..5)
        .map(|i| {
            let mut raster = block_raster(4, 4, 0..2, 0..2, 1);
            fill(&mut raster, 2..4, 2..4, 2);
            fill(&mut raster, 0..1, 3..4, 3);
            Sample::new(format!("frame_{}.jpg", i))
                .with_bitmap(raster)
                .with_annotations(vec![mask(1, 1), mask(2, 1), mask(3, 2)])
        })
        .collect();
    let dataset = dataset(
        TaskType::SegmentationBitmap,
        categories(),
        images.path(),
        samples,
    );
    let options = ExportOptions::new(ExportFormat::CocoPanoptic, out.path()).with_seed(3);
    let outcome = export_dataset(&dataset, &options).unwrap();
    let doc = read_json(&outcome.json_path.unwrap());

    let mut thing_ids = HashSet::new();
    for ann in doc["annotations"].as_array().unwrap() {
        for segment in ann["segments_info"].as_array().unwrap() {
            let id = segment["id"].as_u64().unwrap() as u32;
            if segment["category_id"] == 2 {
                assert_eq!(id, rgb_to_id(ROAD));
            } else {
                assert!(thing_ids.insert(id), "duplicate thing id {}", id);
                assert_ne!(id, rgb_to_id(ROAD));
                assert_ne!(id, 0);
            }
        }
    }
    assert_eq!(thing_ids.len(), 10);
    assert_eq!(outcome.report.counts.files_written, 6);
}

#[test]
fn unlabeled_and_bitmapless_samples_are_skipped() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let samples = vec![
        Sample::new("unlabeled.jpg").with_bitmap(block_raster(2, 2, 0..1, 0..1, 1)),
        Sample::new("no_bitmap.jpg").with_annotations(vec![mask(1, 1)]),
    ];
    let dataset = dataset(
        TaskType::SegmentationBitmap,
        categories(),
        images.path(),
        samples,
    );
    let outcome = export_dataset(
        &dataset,
        &ExportOptions::new(ExportFormat::CocoPanoptic, out.path()),
    )
    .unwrap();

    let report = &outcome.report;
    assert_eq!(report.count_code(ExportIssueCode::SampleNotLabeled), 1);
    assert_eq!(report.count_code(ExportIssueCode::SampleMissingBitmap), 1);
    assert_eq!(report.counts.samples_exported, 0);

    let doc = read_json(&outcome.json_path.unwrap());
    assert_eq!(doc["images"], serde_json::json!([]));
    assert!(!images
        .path()
        .join("unlabeled_label_ground-truth_coco-panoptic.png")
        .exists());
}

#[test]
fn attempt_cap_surfaces_exhaustion() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    let sample = Sample::new("a.jpg")
        .with_bitmap(block_raster(2, 2, 0..1, 0..2, 1))
        .with_annotations(vec![mask(1, 1)]);
    let cats = vec![TaskCategory::new(1, "shadow")
        .with_color([0, 0, 0])
        .with_instances(true)];
    let dataset = dataset(TaskType::SegmentationBitmap, cats, images.path(), vec![sample]);
    let options = ExportOptions::new(ExportFormat::CocoPanoptic, out.path())
        .with_seed(1)
        .with_max_color_attempts(0);

    assert!(matches!(
        export_dataset(&dataset, &options),
        Err(ExportError::ColorSpaceExhausted { .. })
    ));
}

#[test]
fn bbox_datasets_are_rejected() {
    let images = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let dataset = dataset(TaskType::Bboxes, categories(), images.path(), Vec::new());
    let err = export_dataset(
        &dataset,
        &ExportOptions::new(ExportFormat::CocoPanoptic, out.path()),
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::IncompatibleTaskType { .. }));
}
