#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use segexport::ir::{
    DatasetMeta, InMemoryDataset, InstanceAnnotation, LabelRaster, Sample, TaskCategory, TaskType,
};
use segexport::packing::{pack_bitmap, png::encode_png};

pub fn meta(task_type: TaskType, categories: Vec<TaskCategory>, image_dir: &Path) -> DatasetMeta {
    DatasetMeta {
        identifier: "jane/street-scenes".into(),
        name: "street-scenes".into(),
        release: "v1.0".into(),
        labelset: "ground-truth".into(),
        task_type,
        categories,
        image_dir: image_dir.to_path_buf(),
    }
}

pub fn dataset(
    task_type: TaskType,
    categories: Vec<TaskCategory>,
    image_dir: &Path,
    samples: Vec<Sample>,
) -> InMemoryDataset {
    InMemoryDataset::new(meta(task_type, categories, image_dir), samples)
}

/// A `height x width` raster with `label` filled into `rows x cols`.
pub fn block_raster(
    width: usize,
    height: usize,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
    label: u32,
) -> LabelRaster {
    let mut raster = LabelRaster::zeros(width, height);
    fill(&mut raster, rows, cols, label);
    raster
}

pub fn fill(
    raster: &mut LabelRaster,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
    label: u32,
) {
    for row in rows {
        for col in cols.clone() {
            raster.set(row, col, label);
        }
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read json output");
    serde_json::from_str(&text).expect("parse json output")
}

pub fn write_label_png(path: &Path, raster: &LabelRaster) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let bytes = encode_png(&pack_bitmap(raster)).expect("encode label png");
    fs::write(path, bytes).expect("write label png");
}

/// Writes a two-sample segmentation manifest into `dir`:
/// `a.jpg` labeled with one car, `b.jpg` unlabeled.
pub fn write_segmentation_manifest(dir: &Path) -> PathBuf {
    let raster = block_raster(4, 3, 0..2, 1..3, 1);
    write_label_png(&dir.join("labels/a.png"), &raster);
    fs::create_dir_all(dir.join("images")).expect("create image dir");

    let manifest = serde_json::json!({
        "dataset": {
            "identifier": "jane/street-scenes",
            "name": "street-scenes",
            "task_type": "segmentation-bitmap",
            "categories": [
                {"id": 1, "name": "car", "color": [0, 0, 142], "has_instances": true},
                {"id": 2, "name": "road", "color": [128, 64, 128]}
            ]
        },
        "release": "v1.0",
        "labelset": "ground-truth",
        "image_dir": "images",
        "samples": [
            {
                "name": "a.jpg",
                "image": {"width": 4, "height": 3},
                "segmentation_bitmap": "labels/a.png",
                "annotations": [{"id": 1, "category_id": 1}]
            },
            {"name": "b.jpg", "annotations": null}
        ]
    });
    let path = dir.join("manifest.json");
    fs::write(&path, manifest.to_string()).expect("write manifest");
    path
}

pub fn mask(id: u32, category: u32) -> InstanceAnnotation {
    InstanceAnnotation::mask(id, category)
}
