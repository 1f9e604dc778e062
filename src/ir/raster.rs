//! In-memory rasters: per-pixel label ids and 8-bit channel images.
//!
//! Both types store pixels row-major. `LabelRaster` holds one `u32` per
//! pixel; `PixelImage<C>` holds `C` interleaved `u8` channels per pixel.

use crate::error::ExportError;

/// A 2-D grid of label ids. `0` means unlabeled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelRaster {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl LabelRaster {
    /// Creates a raster from row-major data.
    pub fn new(width: usize, height: usize, data: Vec<u32>) -> Result<Self, ExportError> {
        if data.len() != width * height {
            return Err(ExportError::InvalidRaster(format!(
                "expected {} pixels for {}x{}, got {}",
                width * height,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an all-background raster.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Creates a raster from a list of rows.
    ///
    /// All rows must have the same length.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self, ExportError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(ExportError::InvalidRaster(format!(
                "row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                width
            )));
        }
        Self::new(width, height, rows.concat())
    }

    /// Upcasts an 8-bit label raster.
    pub fn from_u8(width: usize, height: usize, data: &[u8]) -> Result<Self, ExportError> {
        Self::new(width, height, data.iter().map(|&v| v as u32).collect())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major pixel values.
    #[inline]
    pub fn as_slice(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u32) {
        self.data[row * self.width + col] = value;
    }

    /// Largest value in the raster, `0` for an empty raster.
    pub fn max_value(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Copies the raster out as a list of rows.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        if self.width == 0 {
            return vec![Vec::new(); self.height];
        }
        self.data.chunks(self.width).map(<[u32]>::to_vec).collect()
    }

    /// Applies `f` to every pixel, producing a new raster of the same size.
    pub fn map(&self, f: impl FnMut(u32) -> u32) -> LabelRaster {
        LabelRaster {
            width: self.width,
            height: self.height,
            data: self.data.iter().copied().map(f).collect(),
        }
    }
}

/// An 8-bit image with `C` interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelImage<const C: usize> {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

/// Single-channel 8-bit image.
pub type GrayImage = PixelImage<1>;
/// Three-channel RGB image.
pub type RgbImage = PixelImage<3>;
/// Four-channel RGBA image.
pub type RgbaImage = PixelImage<4>;

impl<const C: usize> PixelImage<C> {
    /// Creates an image from interleaved row-major data.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ExportError> {
        if data.len() != width * height * C {
            return Err(ExportError::InvalidRaster(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                width * height * C,
                width,
                height,
                C,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Creates an all-zero (black, transparent) image.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * C],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        C
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// The channels of the pixel at `(row, col)`.
    #[inline]
    pub fn pixel(&self, row: usize, col: usize) -> [u8; C] {
        let start = (row * self.width + col) * C;
        let mut out = [0u8; C];
        out.copy_from_slice(&self.data[start..start + C]);
        out
    }

    #[inline]
    pub fn put_pixel(&mut self, row: usize, col: usize, value: [u8; C]) {
        let start = (row * self.width + col) * C;
        self.data[start..start + C].copy_from_slice(&value);
    }

    /// Iterates over pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(C)
    }

    /// Mutable iteration over pixels in row-major order.
    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(C)
    }
}
