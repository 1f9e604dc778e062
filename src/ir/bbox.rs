//! Corner-point bounding boxes as stored by vector and bbox labels.
//!
//! Labels store a box as its two corner points `[[x0, y0], [x1, y1]]` in
//! pixel space. The corners are kept as given: nothing forces
//! `x0 <= x1`, so widths and heights are reported as absolute values where
//! an output format needs them.

use std::fmt;
use std::marker::PhantomData;

/// Marker type for pixel coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pixel {}

/// Marker type for coordinates normalized to `[0, 1]` by the image size.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Normalized {}

/// A box given by two opposite corners in the `TSpace` coordinate space.
#[derive(Clone, Copy, PartialEq)]
pub struct CornerBox<TSpace> {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    _space: PhantomData<TSpace>,
}

impl<TSpace> CornerBox<TSpace> {
    /// Creates a box from its two corners.
    #[inline]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            _space: PhantomData,
        }
    }

    /// COCO `[x, y, width, height]`, taken literally from the stored corners.
    ///
    /// Width and height may be negative when the corners were stored
    /// bottom-right first.
    #[inline]
    pub fn to_xywh(&self) -> [f64; 4] {
        [self.x0, self.y0, self.x1 - self.x0, self.y1 - self.y0]
    }

    /// Center, absolute width and absolute height.
    #[inline]
    pub fn to_cxcywh(&self) -> (f64, f64, f64, f64) {
        (
            (self.x0 + self.x1) / 2.0,
            (self.y0 + self.y1) / 2.0,
            (self.x1 - self.x0).abs(),
            (self.y1 - self.y0).abs(),
        )
    }
}

impl CornerBox<Pixel> {
    /// Builds a box from a label's point list.
    ///
    /// Returns `None` unless at least two points with two coordinates each
    /// are present; only the first two points are used.
    pub fn from_points(points: &[Vec<f64>]) -> Option<Self> {
        match points {
            [p0, p1, ..] if p0.len() >= 2 && p1.len() >= 2 => {
                Some(Self::new(p0[0], p0[1], p1[0], p1[1]))
            }
            _ => None,
        }
    }

    /// Divides x coordinates by the image width and y by the image height.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> CornerBox<Normalized> {
        CornerBox::new(
            self.x0 / image_width,
            self.y0 / image_height,
            self.x1 / image_width,
            self.y1 / image_height,
        )
    }
}

impl<TSpace> fmt::Debug for CornerBox<TSpace> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CornerBox")
            .field("x0", &self.x0)
            .field("y0", &self.y0)
            .field("x1", &self.x1)
            .field("y1", &self.y1)
            .finish()
    }
}
