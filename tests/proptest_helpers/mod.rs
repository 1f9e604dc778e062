#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use segexport::color::Rgb;
use segexport::ir::{Category, LabelRaster};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// `(height, width, mask)` with the mask in column-major order.
pub fn arb_binary_mask(max_side: u32) -> BoxedStrategy<(u32, u32, Vec<u8>)> {
    (0..=max_side, 0..=max_side)
        .prop_flat_map(|(height, width)| {
            let n = (height * width) as usize;
            (
                Just(height),
                Just(width),
                prop::collection::vec(prop_oneof![3 => Just(0u8), 1 => Just(1u8)], n),
            )
        })
        .boxed()
}

/// A raster of small instance ids; zero-sized sides are allowed.
pub fn arb_label_raster(max_side: usize, max_id: u32) -> BoxedStrategy<LabelRaster> {
    (0..=max_side, 0..=max_side)
        .prop_flat_map(move |(width, height)| {
            prop::collection::vec(0..=max_id, width * height).prop_map(move |data| {
                LabelRaster::new(width, height, data).expect("sized to width * height")
            })
        })
        .boxed()
}

/// A raster whose ids use the full 24-bit packing range.
pub fn arb_wide_raster(max_side: usize) -> BoxedStrategy<LabelRaster> {
    (1..=max_side, 1..=max_side)
        .prop_flat_map(|(width, height)| {
            prop::collection::vec(0u32..(1 << 24), width * height).prop_map(move |data| {
                LabelRaster::new(width, height, data).expect("sized to width * height")
            })
        })
        .boxed()
}

pub fn arb_rgb() -> BoxedStrategy<Rgb> {
    any::<[u8; 3]>().boxed()
}

/// Categories with distinct ids, at least one of them a thing.
pub fn arb_categories(max: usize) -> BoxedStrategy<Vec<Category>> {
    prop::collection::vec((arb_rgb(), any::<bool>()), 1..=max)
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, (color, isthing))| {
                    Category::new(
                        index as u32 + 1,
                        format!("category_{}", index),
                        color,
                        isthing || index == 0,
                    )
                })
                .collect()
        })
        .boxed()
}
