//! Raster transforms behind the label-image outputs.
//!
//! - [`semantic_bitmap`]: instance ids to category values
//! - [`panoptic_composite`]: instances filled with their allocated colors
//! - [`colorize`]: preview images from a palette
//! - [`pack_bitmap`] / [`unpack_bitmap`]: lossless id storage in RGBA8

pub mod png;

use std::collections::HashMap;

use crate::color::{id_to_rgb, packed_ids_to_raster, palette_color, Rgb};
use crate::ir::{GrayImage, InstanceAnnotation, InstanceId, LabelRaster, RgbImage, RgbaImage, Sample};

/// Default offset added to category ids in semantic rasters, so category 0
/// stays distinct from background.
pub const DEFAULT_ID_INCREMENT: u32 = 1;

/// Replaces every instance id with its category id plus `id_increment`.
///
/// Ids not listed in `annotations` (background included) become 0. A
/// category value past `u32::MAX` saturates, so labeled pixels never
/// turn into background.
pub fn semantic_bitmap(
    raster: &LabelRaster,
    annotations: &[InstanceAnnotation],
    id_increment: u32,
) -> LabelRaster {
    let lookup: HashMap<u32, u32> = annotations
        .iter()
        .map(|ann| {
            (
                ann.id.as_u32(),
                ann.category_id.as_u32().saturating_add(id_increment),
            )
        })
        .collect();

    raster.map(|value| {
        if value == 0 {
            0
        } else {
            lookup.get(&value).copied().unwrap_or(0)
        }
    })
}

/// The semantic raster of a sample, `None` if it has no bitmap or no
/// annotations.
pub fn semantic_bitmap_for_sample(sample: &Sample, id_increment: u32) -> Option<LabelRaster> {
    let raster = sample.segmentation_bitmap.as_ref()?;
    let annotations = sample.annotations.as_deref()?;
    Some(semantic_bitmap(raster, annotations, id_increment))
}

/// Fills each listed instance with its color; everything else stays black.
pub fn panoptic_composite(raster: &LabelRaster, colors: &[(InstanceId, Rgb)]) -> RgbImage {
    let lookup: HashMap<u32, Rgb> = colors.iter().map(|(id, color)| (id.as_u32(), *color)).collect();

    let mut image = RgbImage::zeros(raster.width(), raster.height());
    for (pixel, value) in image.pixels_mut().zip(raster.as_slice()) {
        if let Some(color) = lookup.get(value) {
            pixel.copy_from_slice(color);
        }
    }
    image
}

/// Renders a raster as a color preview.
///
/// A non-zero value `v` gets `colormap[v - 1]`, or the built-in palette
/// entry for `v - 1` when no colormap is given or it is too short.
pub fn colorize(raster: &LabelRaster, colormap: Option<&[Rgb]>) -> RgbImage {
    let mut cache: HashMap<u32, Rgb> = HashMap::new();
    let mut image = RgbImage::zeros(raster.width(), raster.height());
    for (pixel, &value) in image.pixels_mut().zip(raster.as_slice()) {
        if value == 0 {
            continue;
        }
        let color = *cache.entry(value).or_insert_with(|| {
            let index = (value - 1) as usize;
            colormap
                .and_then(|map| map.get(index).copied())
                .unwrap_or_else(|| palette_color(index))
        });
        pixel.copy_from_slice(&color);
    }
    image
}

/// Stores a raster losslessly as RGBA8: R, G, B carry the id and alpha is
/// always 255. Only the low 24 bits of each id are kept.
pub fn pack_bitmap(raster: &LabelRaster) -> RgbaImage {
    let mut image = RgbaImage::zeros(raster.width(), raster.height());
    for (pixel, &id) in image.pixels_mut().zip(raster.as_slice()) {
        let [r, g, b] = id_to_rgb(id);
        pixel.copy_from_slice(&[r, g, b, 255]);
    }
    image
}

/// Recovers the id raster from an RGBA image, ignoring alpha.
pub fn unpack_bitmap(image: &RgbaImage) -> LabelRaster {
    packed_ids_to_raster(image.width(), image.height(), image.pixels())
}

/// Converts a raster to 8-bit gray, `None` if some value exceeds 255.
pub fn to_gray8(raster: &LabelRaster) -> Option<GrayImage> {
    let data = raster
        .as_slice()
        .iter()
        .map(|&v| u8::try_from(v).ok())
        .collect::<Option<Vec<u8>>>()?;
    GrayImage::new(raster.width(), raster.height(), data).ok()
}
