//! Id/color codec and the built-in label palette.
//!
//! Ids are packed into colors little-endian, one byte per channel:
//! `id = r + 256 * g + 65536 * b`. Only the low 24 bits of an id survive
//! a round trip through a color.

mod allocator;

pub use allocator::IdGenerator;

use crate::ir::{LabelRaster, RgbImage};

/// An RGB triple.
pub type Rgb = [u8; 3];

/// Number of distinct ids a color can carry.
pub const ID_SPACE: u32 = 1 << 24;

/// Built-in palette used when a category has no color of its own and for
/// colorized previews.
pub const COLORMAP: [Rgb; 36] = [
    [0, 113, 188],
    [216, 82, 24],
    [236, 176, 31],
    [125, 46, 141],
    [118, 171, 47],
    [76, 189, 237],
    [161, 19, 46],
    [255, 0, 0],
    [255, 127, 0],
    [190, 190, 0],
    [0, 255, 0],
    [0, 0, 255],
    [170, 0, 255],
    [84, 84, 0],
    [84, 170, 0],
    [84, 255, 0],
    [170, 84, 0],
    [170, 170, 0],
    [170, 255, 0],
    [255, 84, 0],
    [255, 170, 0],
    [255, 255, 0],
    [0, 84, 127],
    [0, 170, 127],
    [0, 255, 127],
    [84, 0, 127],
    [84, 84, 127],
    [84, 170, 127],
    [84, 255, 127],
    [170, 0, 127],
    [170, 84, 127],
    [170, 170, 127],
    [170, 255, 127],
    [255, 0, 127],
    [255, 84, 127],
    [255, 170, 127],
];

/// Palette entry for `index`, cycling through [`COLORMAP`].
#[inline]
pub fn palette_color(index: usize) -> Rgb {
    COLORMAP[index % COLORMAP.len()]
}

/// Splits an id into its color. Bits above the 24th are dropped.
#[inline]
pub fn id_to_rgb(id: u32) -> Rgb {
    [
        (id & 0xff) as u8,
        ((id >> 8) & 0xff) as u8,
        ((id >> 16) & 0xff) as u8,
    ]
}

/// Recombines a color into its id.
#[inline]
pub fn rgb_to_id(color: Rgb) -> u32 {
    color[0] as u32 + 256 * color[1] as u32 + 256 * 256 * color[2] as u32
}

/// Converts every pixel of an id raster to its color.
pub fn raster_to_rgb(raster: &LabelRaster) -> RgbImage {
    let mut image = RgbImage::zeros(raster.width(), raster.height());
    for (pixel, &id) in image.pixels_mut().zip(raster.as_slice()) {
        pixel.copy_from_slice(&id_to_rgb(id));
    }
    image
}

/// Recombines every pixel of an RGB image into an id raster.
pub fn image_to_raster(image: &RgbImage) -> LabelRaster {
    packed_ids_to_raster(image.width(), image.height(), image.pixels())
}

/// Builds a raster from row-major pixels whose first three channels pack
/// an id. Channels past the third are ignored.
pub(crate) fn packed_ids_to_raster<'a>(
    width: usize,
    height: usize,
    pixels: impl Iterator<Item = &'a [u8]>,
) -> LabelRaster {
    let mut raster = LabelRaster::zeros(width, height);
    let stride = width.max(1);
    for (index, pixel) in pixels.enumerate() {
        if let [r, g, b, ..] = *pixel {
            raster.set(index / stride, index % stride, rgb_to_id([r, g, b]));
        }
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::RgbaImage;

    #[test]
    fn test_id_to_rgb_byte_order() {
        assert_eq!(id_to_rgb(0), [0, 0, 0]);
        assert_eq!(id_to_rgb(1), [1, 0, 0]);
        assert_eq!(id_to_rgb(256), [0, 1, 0]);
        assert_eq!(id_to_rgb(65536), [0, 0, 1]);
        assert_eq!(id_to_rgb(0x00AB_CDEF), [0xEF, 0xCD, 0xAB]);
    }

    #[test]
    fn test_rgb_to_id_does_not_overflow() {
        assert_eq!(rgb_to_id([255, 255, 255]), ID_SPACE - 1);
    }

    #[test]
    fn test_high_bits_are_dropped() {
        assert_eq!(id_to_rgb(ID_SPACE + 5), [5, 0, 0]);
    }

    #[test]
    fn test_roundtrip_samples() {
        for id in [0, 1, 255, 256, 65535, 65536, 1_000_000, ID_SPACE - 1] {
            assert_eq!(rgb_to_id(id_to_rgb(id)), id);
        }
    }

    #[test]
    fn test_raster_roundtrip() {
        let raster = LabelRaster::from_rows(&[vec![0, 1, 70_000], vec![256, 3, 0]]).unwrap();
        let image = raster_to_rgb(&raster);
        assert_eq!(image.pixel(0, 2), id_to_rgb(70_000));
        assert_eq!(image_to_raster(&image), raster);
    }

    #[test]
    fn test_rgba_alpha_is_ignored() {
        let image = RgbaImage::new(2, 1, vec![1, 0, 0, 255, 0, 1, 0, 17]).unwrap();
        let raster = packed_ids_to_raster(image.width(), image.height(), image.pixels());
        assert_eq!(raster.as_slice(), &[1, 256]);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(0), [0, 113, 188]);
        assert_eq!(palette_color(36), palette_color(0));
        assert_eq!(palette_color(71), [255, 170, 127]);
    }
}
