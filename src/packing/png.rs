//! PNG encoding and decoding of label images.

use std::io::Cursor;
use std::path::Path;

use png::{BitDepth, ColorType, Decoder, Encoder};

use crate::color::rgb_to_id;
use crate::error::ExportError;
use crate::ir::{LabelRaster, PixelImage};

fn color_type_for(channels: usize) -> Result<ColorType, ExportError> {
    match channels {
        1 => Ok(ColorType::Grayscale),
        2 => Ok(ColorType::GrayscaleAlpha),
        3 => Ok(ColorType::Rgb),
        4 => Ok(ColorType::Rgba),
        n => Err(ExportError::PngEncode(format!("unsupported channel count {}", n))),
    }
}

fn encode(
    width: usize,
    height: usize,
    color_type: ColorType,
    bit_depth: BitDepth,
    data: &[u8],
) -> Result<Vec<u8>, ExportError> {
    let width = u32::try_from(width)
        .map_err(|_| ExportError::PngEncode(format!("width {} too large", width)))?;
    let height = u32::try_from(height)
        .map_err(|_| ExportError::PngEncode(format!("height {} too large", height)))?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(bit_depth);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| ExportError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Encodes an 8-bit image with `C` interleaved channels.
pub fn encode_png<const C: usize>(image: &PixelImage<C>) -> Result<Vec<u8>, ExportError> {
    encode(
        image.width(),
        image.height(),
        color_type_for(C)?,
        BitDepth::Eight,
        image.as_slice(),
    )
}

/// Encodes a raster as 16-bit grayscale.
///
/// Values above `u16::MAX` are rejected rather than truncated.
pub fn encode_gray16_png(raster: &LabelRaster) -> Result<Vec<u8>, ExportError> {
    let mut data = Vec::with_capacity(raster.as_slice().len() * 2);
    for &value in raster.as_slice() {
        let value = u16::try_from(value).map_err(|_| {
            ExportError::PngEncode(format!("value {} does not fit 16-bit gray", value))
        })?;
        data.extend_from_slice(&value.to_be_bytes());
    }
    encode(
        raster.width(),
        raster.height(),
        ColorType::Grayscale,
        BitDepth::Sixteen,
        &data,
    )
}

/// Decodes a label PNG into a raster.
///
/// 8-bit RGB and RGBA images are read as packed ids (alpha ignored);
/// 8- and 16-bit grayscale images are read as plain values.
pub fn decode_label_png(bytes: &[u8]) -> Result<LabelRaster, ExportError> {
    let mut reader = Decoder::new(bytes)
        .read_info()
        .map_err(|e| ExportError::PngDecode(e.to_string()))?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| ExportError::PngDecode(e.to_string()))?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width as usize, info.height as usize);
    let data: Vec<u32> = match (info.color_type, info.bit_depth) {
        (ColorType::Rgba, BitDepth::Eight) => buf
            .chunks_exact(4)
            .map(|px| rgb_to_id([px[0], px[1], px[2]]))
            .collect(),
        (ColorType::Rgb, BitDepth::Eight) => buf
            .chunks_exact(3)
            .map(|px| rgb_to_id([px[0], px[1], px[2]]))
            .collect(),
        (ColorType::Grayscale, BitDepth::Eight) => buf.iter().map(|&v| v as u32).collect(),
        (ColorType::Grayscale, BitDepth::Sixteen) => buf
            .chunks_exact(2)
            .map(|px| u16::from_be_bytes([px[0], px[1]]) as u32)
            .collect(),
        (color_type, bit_depth) => {
            return Err(ExportError::PngDecode(format!(
                "unsupported label PNG layout {:?} at {:?}",
                color_type, bit_depth
            )))
        }
    };

    LabelRaster::new(width, height, data)
}

/// Reads and decodes a label PNG from disk.
pub fn read_label_png(path: &Path) -> Result<LabelRaster, ExportError> {
    let bytes = std::fs::read(path).map_err(|e| ExportError::BitmapRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    decode_label_png(&bytes).map_err(|e| ExportError::BitmapRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
