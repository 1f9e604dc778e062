//! Per-instance geometry of label rasters.
//!
//! [`regions`] walks a raster once and returns, for every non-zero label,
//! its bounding box and pixel count. Exporters analyse each sample once
//! and look instances up by label value.

pub mod rle;

use std::collections::BTreeMap;

use crate::ir::{InstanceId, LabelRaster};

/// Bounding box and area of one label value in a raster.
///
/// The box is half-open: `min_row..max_row` and `min_col..max_col`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub min_row: usize,
    pub min_col: usize,
    pub max_row: usize,
    pub max_col: usize,
    pub area: u64,
}

impl Region {
    fn seed(label: u32, row: usize, col: usize) -> Self {
        Self {
            label,
            min_row: row,
            min_col: col,
            max_row: row + 1,
            max_col: col + 1,
            area: 0,
        }
    }

    fn include(&mut self, row: usize, col: usize) {
        self.min_row = self.min_row.min(row);
        self.min_col = self.min_col.min(col);
        self.max_row = self.max_row.max(row + 1);
        self.max_col = self.max_col.max(col + 1);
        self.area += 1;
    }

    /// COCO `[x, y, width, height]`.
    pub fn bbox_xywh(&self) -> [u64; 4] {
        [
            self.min_col as u64,
            self.min_row as u64,
            (self.max_col - self.min_col) as u64,
            (self.max_row - self.min_row) as u64,
        ]
    }
}

/// Regions of every non-zero label in a raster.
#[derive(Clone, Debug, Default)]
pub struct RegionIndex {
    regions: BTreeMap<u32, Region>,
}

impl RegionIndex {
    /// Region of an instance, `None` if it has no labeled pixels.
    pub fn get(&self, instance: InstanceId) -> Option<&Region> {
        self.regions.get(&instance.as_u32())
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }
}

/// Computes the bounding box and area of every non-zero label.
///
/// Pixels sharing a label form one region whether or not they are
/// connected.
pub fn regions(raster: &LabelRaster) -> RegionIndex {
    let mut regions: BTreeMap<u32, Region> = BTreeMap::new();
    let width = raster.width();
    if width == 0 {
        return RegionIndex { regions };
    }

    for (index, &label) in raster.as_slice().iter().enumerate() {
        if label == 0 {
            continue;
        }
        let (row, col) = (index / width, index % width);
        regions
            .entry(label)
            .or_insert_with(|| Region::seed(label, row, col))
            .include(row, col);
    }

    RegionIndex { regions }
}

/// Bounding box `[min_row, min_col, max_row, max_col)` of a row-major
/// binary mask, `None` when the mask is empty.
pub fn binary_mask_bbox(mask: &[u8], width: usize) -> Option<[usize; 4]> {
    if width == 0 {
        return None;
    }
    let mut bbox: Option<[usize; 4]> = None;
    for (index, _) in mask.iter().enumerate().filter(|&(_, &v)| v != 0) {
        let (row, col) = (index / width, index % width);
        bbox = Some(match bbox {
            None => [row, col, row + 1, col + 1],
            Some([r0, c0, r1, c1]) => [r0.min(row), c0.min(col), r1.max(row + 1), c1.max(col + 1)],
        });
    }
    bbox
}

/// The column-major binary mask of one instance, as RLE encoding expects.
pub fn instance_mask_column_major(raster: &LabelRaster, instance: InstanceId) -> Vec<u8> {
    let (width, height) = (raster.width(), raster.height());
    let target = instance.as_u32();
    let mut mask = Vec::with_capacity(width * height);
    for col in 0..width {
        for row in 0..height {
            mask.push(u8::from(raster.get(row, col) == target));
        }
    }
    mask
}
