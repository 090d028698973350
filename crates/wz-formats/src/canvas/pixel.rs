//! Pixel format expansion
//!
//! Canvas payloads decompress to one of a small family of packed pixel
//! encodings, selected by the numeric format code in the record header.
//! Expansion into the canonical [`PixelBuffer`] must be bit-exact with the
//! producer; a payload whose length does not match the format's formula is
//! rejected outright, never truncated or padded.

use tracing::trace;

use crate::error::{Result, WzError};

/// Channel layout of a decoded pixel buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 32-bit ARGB, 4 bytes per pixel (B, G, R, A in memory)
    Argb8888,
    /// 16-bit RGB565, 2 bytes per pixel
    Rgb565,
    /// Grayscale expanded to 32-bit ARGB (alpha 255, gray in R/G/B)
    GrayArgb8888,
}

impl PixelLayout {
    /// Bytes per pixel for this layout
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Argb8888 | Self::GrayArgb8888 => 4,
            Self::Rgb565 => 2,
        }
    }
}

/// The closed set of known canvas format codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasFormat {
    /// Code 1: 4 bits per channel pair, one byte per two channel values
    Argb4444,
    /// Code 2: 32-bit ARGB stored as-is
    Argb8888,
    /// Code 513: 16-bit RGB565 stored as-is
    Rgb565,
    /// Code 517: 1 bit per 16-pixel run of grayscale
    Mono,
    /// Anything else; carried for diagnostics, always rejected
    Unknown(i32),
}

impl CanvasFormat {
    /// Classify a raw format code
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Argb4444,
            2 => Self::Argb8888,
            513 => Self::Rgb565,
            517 => Self::Mono,
            other => Self::Unknown(other),
        }
    }

    /// The on-disk format code
    pub fn code(self) -> i32 {
        match self {
            Self::Argb4444 => 1,
            Self::Argb8888 => 2,
            Self::Rgb565 => 513,
            Self::Mono => 517,
            Self::Unknown(code) => code,
        }
    }
}

/// Canonical decoded bitmap
///
/// Owned bytes plus an explicit descriptor; any platform image type is the
/// caller's business. Invariant: `data.len() == stride * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    stride: usize,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Channel layout
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Raw pixel bytes, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer, returning the raw pixel bytes
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Expand decompressed payload bytes into a pixel buffer
///
/// Dispatches on the format code; unknown codes fail with
/// [`WzError::UnsupportedFormat`] carrying the code, and length violations
/// with [`WzError::FormatMismatch`].
pub fn expand(format: i32, width: u32, height: u32, data: &[u8]) -> Result<PixelBuffer> {
    if width == 0 || height == 0 {
        return Err(WzError::CorruptData(format!(
            "degenerate canvas dimensions {width}x{height}"
        )));
    }

    trace!(format, width, height, len = data.len(), "expanding pixels");

    match CanvasFormat::from_code(format) {
        CanvasFormat::Argb4444 => expand_argb4444(width, height, data),
        CanvasFormat::Argb8888 => expand_argb8888(width, height, data),
        CanvasFormat::Rgb565 => expand_rgb565(width, height, data),
        CanvasFormat::Mono => expand_mono(width, height, data),
        CanvasFormat::Unknown(code) => Err(WzError::UnsupportedFormat(code)),
    }
}

fn check_len(format: i32, width: u32, height: u32, expected: usize, data: &[u8]) -> Result<()> {
    if data.len() != expected {
        return Err(WzError::FormatMismatch {
            format,
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Code 1: each nibble is a 4-bit channel value, replicated to 8 bits by
/// multiplying with 0x11 (so 0xF becomes 0xFF). Low nibble first. The
/// doubled byte stream is the 32-bit ARGB surface.
fn expand_argb4444(width: u32, height: u32, data: &[u8]) -> Result<PixelBuffer> {
    let expected = width as usize * height as usize * 2;
    check_len(1, width, height, expected, data)?;

    let mut argb = vec![0u8; data.len() * 2];
    for (i, &b) in data.iter().enumerate() {
        argb[i * 2] = (b & 0x0F) * 0x11;
        argb[i * 2 + 1] = ((b & 0xF0) >> 4) * 0x11;
    }

    Ok(PixelBuffer {
        width,
        height,
        stride: width as usize * 4,
        layout: PixelLayout::Argb8888,
        data: argb,
    })
}

/// Code 2: already the target layout; pass through.
fn expand_argb8888(width: u32, height: u32, data: &[u8]) -> Result<PixelBuffer> {
    let expected = width as usize * height as usize * 4;
    check_len(2, width, height, expected, data)?;

    Ok(PixelBuffer {
        width,
        height,
        stride: width as usize * 4,
        layout: PixelLayout::Argb8888,
        data: data.to_vec(),
    })
}

/// Code 513: 16-bit RGB565 pass-through. Stride comes from the byte count
/// rather than the width so row padding survives the reinterpretation.
fn expand_rgb565(width: u32, height: u32, data: &[u8]) -> Result<PixelBuffer> {
    let expected = width as usize * height as usize * 2;
    check_len(513, width, height, expected, data)?;

    Ok(PixelBuffer {
        width,
        height,
        stride: data.len() / height as usize,
        layout: PixelLayout::Rgb565,
        data: data.to_vec(),
    })
}

/// Code 517: 1 bit per 16-pixel run. Bits are taken most-significant first;
/// each bit emits 16 consecutive pixels of gray 0 or 255, the horizontal
/// cursor wrapping to the next row at `width`. The traversal order is part
/// of the format; a width that is not a multiple of 16 shears the output
/// rather than failing. The byte count is the pixel count divided by 128,
/// rounded up so canvases smaller than one full byte's worth of runs remain
/// representable; trailing runs past the last pixel are discarded.
fn expand_mono(width: u32, height: u32, data: &[u8]) -> Result<PixelBuffer> {
    let width = width as usize;
    let height = height as usize;
    let total = width * height;
    let expected = total.div_ceil(128);
    check_len(517, width as u32, height as u32, expected, data)?;

    let mut argb = vec![0u8; total * 4];
    let mut x = 0usize;
    let mut y = 0usize;
    let mut emitted = 0usize;
    'bytes: for &byte in data {
        for j in 0..8 {
            let gray = ((byte >> (7 - j)) & 1) * 0xFF;
            for _ in 0..16 {
                if emitted == total {
                    break 'bytes;
                }
                if x == width {
                    x = 0;
                    y += 1;
                }
                let at = (y * width + x) * 4;
                argb[at] = gray;
                argb[at + 1] = gray;
                argb[at + 2] = gray;
                argb[at + 3] = 0xFF;
                x += 1;
                emitted += 1;
            }
        }
    }

    Ok(PixelBuffer {
        width: width as u32,
        height: height as u32,
        stride: width * 4,
        layout: PixelLayout::GrayArgb8888,
        data: argb,
    })
}
