//! COCO run-length encoding of binary masks.
//!
//! Masks are scanned column-major (down each column, left to right). Runs
//! alternate background/foreground and always start with background, so a
//! mask whose first pixel is set begins with a zero-length run.
//!
//! The compressed string form packs each count into 5-bit groups
//! (`0x20` = more groups follow, sign in `0x10` of the last group) offset
//! by 48 into printable ASCII. From the fourth count on, the value stored
//! is the difference to the count two positions back.

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// An uncompressed RLE mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rle {
    pub height: u32,
    pub width: u32,
    pub counts: Vec<u32>,
}

/// The JSON shape COCO uses for a compressed RLE segmentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressedRle {
    /// `[height, width]`
    pub size: [u32; 2],
    pub counts: String,
}

/// Encodes a column-major binary mask of `height * width` pixels.
pub fn encode(mask: &[u8], height: u32, width: u32) -> Result<Rle, ExportError> {
    let n = height as usize * width as usize;
    if mask.len() != n {
        return Err(ExportError::InvalidRle(format!(
            "mask has {} pixels, expected {} for {}x{}",
            mask.len(),
            n,
            height,
            width
        )));
    }

    let mut counts = Vec::new();
    let mut previous = false;
    let mut run: u32 = 0;
    for &value in mask {
        let value = value != 0;
        if value != previous {
            counts.push(run);
            run = 0;
            previous = value;
        }
        run += 1;
    }
    counts.push(run);

    Ok(Rle {
        height,
        width,
        counts,
    })
}

/// Decodes an RLE back into a column-major binary mask.
pub fn decode(rle: &Rle) -> Result<Vec<u8>, ExportError> {
    let n = rle.height as usize * rle.width as usize;
    let total: u64 = rle.counts.iter().map(|&c| c as u64).sum();
    if total != n as u64 {
        return Err(ExportError::InvalidRle(format!(
            "counts cover {} pixels, expected {}",
            total, n
        )));
    }

    let mut mask = Vec::with_capacity(n);
    let mut value = 0u8;
    for &count in &rle.counts {
        mask.extend(std::iter::repeat_n(value, count as usize));
        value = 1 - value;
    }
    Ok(mask)
}

/// Number of foreground pixels.
pub fn area(rle: &Rle) -> u64 {
    rle.counts.iter().skip(1).step_by(2).map(|&c| c as u64).sum()
}

/// Bounding box `[x, y, width, height]` of the foreground.
pub fn to_bbox(rle: &Rle) -> [u64; 4] {
    let h = rle.height as u64;
    if h == 0 {
        return [0; 4];
    }

    let (mut xs, mut ys) = (u64::MAX, u64::MAX);
    let (mut xe, mut ye) = (0u64, 0u64);
    let mut cursor = 0u64;
    for (index, &count) in rle.counts.iter().enumerate() {
        let count = count as u64;
        if index % 2 == 1 && count > 0 {
            let (start, end) = (cursor, cursor + count - 1);
            let (x1, y1) = (start / h, start % h);
            let (x2, y2) = (end / h, end % h);
            xs = xs.min(x1);
            xe = xe.max(x2 + 1);
            if x1 == x2 {
                ys = ys.min(y1);
                ye = ye.max(y2 + 1);
            } else {
                // The run wraps at least one column boundary.
                ys = 0;
                ye = h;
            }
        }
        cursor += count;
    }

    if xs == u64::MAX {
        return [0; 4];
    }
    [xs, ys, xe - xs, ye - ys]
}

impl Rle {
    /// Encodes the counts into COCO's compressed string.
    pub fn to_compressed_string(&self) -> String {
        let mut out = String::with_capacity(self.counts.len() * 2);
        for (index, &count) in self.counts.iter().enumerate() {
            let mut x = count as i64;
            if index > 2 {
                x -= self.counts[index - 2] as i64;
            }
            loop {
                let mut c = (x & 0x1f) as u8;
                x >>= 5;
                let more = if c & 0x10 != 0 { x != -1 } else { x != 0 };
                if more {
                    c |= 0x20;
                }
                out.push((c + 48) as char);
                if !more {
                    break;
                }
            }
        }
        out
    }

    /// Parses COCO's compressed string form.
    pub fn from_compressed_str(s: &str, height: u32, width: u32) -> Result<Self, ExportError> {
        let bytes = s.as_bytes();
        let mut counts: Vec<u32> = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            let mut x: i64 = 0;
            let mut shift = 0u32;
            loop {
                let byte = *bytes
                    .get(pos)
                    .ok_or_else(|| ExportError::InvalidRle("truncated count".to_string()))?;
                let c = byte.checked_sub(48).filter(|c| *c < 64).ok_or_else(|| {
                    ExportError::InvalidRle(format!("invalid character {:?}", byte as char))
                })? as i64;
                if shift > 55 {
                    return Err(ExportError::InvalidRle("count too large".to_string()));
                }
                x |= (c & 0x1f) << shift;
                pos += 1;
                shift += 5;
                if c & 0x20 == 0 {
                    if c & 0x10 != 0 {
                        x |= -1i64 << shift;
                    }
                    break;
                }
            }
            if counts.len() > 2 {
                x += counts[counts.len() - 2] as i64;
            }
            let count = u32::try_from(x)
                .map_err(|_| ExportError::InvalidRle(format!("count {} out of range", x)))?;
            counts.push(count);
        }

        Ok(Self {
            height,
            width,
            counts,
        })
    }

    /// The COCO JSON representation.
    pub fn compress(&self) -> CompressedRle {
        CompressedRle {
            size: [self.height, self.width],
            counts: self.to_compressed_string(),
        }
    }
}

impl CompressedRle {
    /// Parses the counts string back into runs.
    pub fn decompress(&self) -> Result<Rle, ExportError> {
        Rle::from_compressed_str(&self.counts, self.size[0], self.size[1])
    }
}
