//! Canvas property decoding
//!
//! A canvas record is a bitmap with an optional inline child-property list:
//! header fields (dimensions and a summed format code), then a
//! length-prefixed payload that runs through up to three stages — the
//! cipher block stream (encrypted archives only), DEFLATE, and pixel
//! expansion.
//!
//! Decoding is either eager (the record produces a [`PixelBuffer`] on the
//! spot) or lazy (the payload's byte range is recorded and the cursor
//! skips past it; [`WzCanvas::resolve`] runs the same pipeline later over
//! an independent view of the image bytes, so siblings can resolve without
//! sharing cursor state).

mod cipher_stream;
mod inflate;
mod pixel;

pub use cipher_stream::decrypt_blocks;
pub use inflate::inflate;
pub use pixel::{CanvasFormat, PixelBuffer, PixelLayout};

use tracing::debug;
use wz_crypto::WzKeyStream;

use crate::context::{DecodeContext, DecodeMode};
use crate::cursor::WzCursor;
use crate::error::{Result, WzError};
use crate::property::{self, WzProperty};

/// Resolution state of a canvas node
///
/// Once resolved, the pixel buffer is immutable and its dimensions match
/// the header-declared width and height.
#[derive(Debug)]
pub enum CanvasState {
    /// Payload skipped; `start..start + len` is its absolute byte range
    /// (including the flag byte) in the image slice
    Unresolved {
        /// Absolute payload start
        start: usize,
        /// Payload length in bytes
        len: usize,
    },
    /// Payload decoded
    Resolved(PixelBuffer),
}

/// A canvas property: a bitmap plus optional child properties
#[derive(Debug)]
pub struct WzCanvas {
    width: u32,
    height: u32,
    format: i32,
    /// Child properties parsed from the record's inline list
    pub children: Vec<WzProperty>,
    state: CanvasState,
}

impl WzCanvas {
    /// Parse a canvas record at the cursor
    ///
    /// In lazy mode the cursor still ends up past the payload; the node
    /// records the byte range for [`resolve`](Self::resolve).
    pub fn parse(cursor: &mut WzCursor<'_>, ctx: DecodeContext<'_>) -> Result<Self> {
        let mut canvas = Self {
            width: 0,
            height: 0,
            format: 0,
            children: Vec::new(),
            state: CanvasState::Unresolved { start: 0, len: 0 },
        };
        canvas.parse_into(cursor, ctx)?;
        Ok(canvas)
    }

    /// Re-entrant header parse
    ///
    /// Parsing the same header twice is supported and must not duplicate
    /// children: the inline list is adopted only when the node has none.
    pub fn parse_into(&mut self, cursor: &mut WzCursor<'_>, ctx: DecodeContext<'_>) -> Result<()> {
        cursor.skip(1)?;
        if cursor.read_u8()? == 1 {
            cursor.skip(2)?;
            let children = property::parse_property_list(cursor, ctx)?;
            if self.children.is_empty() {
                self.children = children;
            }
        }

        let width = cursor.read_wz_int()?;
        let height = cursor.read_wz_int()?;
        let format1 = cursor.read_wz_int()?;
        let format2 = cursor.read_u8()?;
        self.width = checked_dimension(width, "width")?;
        self.height = checked_dimension(height, "height")?;
        self.format = format1.wrapping_add(i32::from(format2));

        cursor.skip(4)?;
        let block_len = cursor.read_i32_le()?;
        let block_len = usize::try_from(block_len).ok().filter(|&l| l >= 1).ok_or_else(|| {
            WzError::CorruptData(format!("canvas block length {block_len} cannot hold a payload"))
        })?;

        match ctx.mode {
            DecodeMode::Lazy => {
                let start = cursor.position();
                cursor.skip(block_len)?;
                self.state = CanvasState::Unresolved {
                    start,
                    len: block_len,
                };
            }
            DecodeMode::Eager => {
                cursor.skip(1)?; // flag byte
                let payload = cursor.read_bytes(block_len - 1)?;
                debug!(
                    width = self.width,
                    height = self.height,
                    format = self.format,
                    payload = payload.len(),
                    "decoding canvas"
                );
                self.state = CanvasState::Resolved(decode_payload(
                    payload,
                    self.width,
                    self.height,
                    self.format,
                    ctx.key,
                )?);
            }
        }
        Ok(())
    }

    /// Resolve a lazy node against the image bytes it was parsed from
    ///
    /// Resolution is a pure function of the recorded byte range and the
    /// archive key; resolving an already-resolved node returns the
    /// existing buffer unchanged.
    pub fn resolve(&mut self, image: &[u8], key: Option<&WzKeyStream>) -> Result<&PixelBuffer> {
        if let CanvasState::Unresolved { start, len } = self.state {
            let mut cursor = WzCursor::new(image);
            cursor.seek(start)?;
            cursor.skip(1)?; // flag byte
            let payload = cursor.read_bytes(len - 1)?;
            debug!(
                width = self.width,
                height = self.height,
                format = self.format,
                "resolving lazy canvas"
            );
            self.state = CanvasState::Resolved(decode_payload(
                payload,
                self.width,
                self.height,
                self.format,
                key,
            )?);
        }

        match &self.state {
            CanvasState::Resolved(buffer) => Ok(buffer),
            CanvasState::Unresolved { .. } => Err(WzError::CorruptData(
                "canvas resolution left the node unresolved".to_string(),
            )),
        }
    }

    /// Header-declared width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Header-declared height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Effective format code (both header parts summed)
    pub fn format(&self) -> i32 {
        self.format
    }

    /// The decoded pixel buffer, if this node is resolved
    pub fn pixels(&self) -> Option<&PixelBuffer> {
        match &self.state {
            CanvasState::Resolved(buffer) => Some(buffer),
            CanvasState::Unresolved { .. } => None,
        }
    }

    /// The recorded payload byte range, if this node is unresolved
    pub fn byte_range(&self) -> Option<(usize, usize)> {
        match self.state {
            CanvasState::Unresolved { start, len } => Some((start, len)),
            CanvasState::Resolved(_) => None,
        }
    }
}

fn checked_dimension(value: i32, axis: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| WzError::CorruptData(format!("negative canvas {axis} {value}")))
}

/// Run a raw payload through decrypt, inflate and pixel expansion
fn decode_payload(
    payload: &[u8],
    width: u32,
    height: u32,
    format: i32,
    key: Option<&WzKeyStream>,
) -> Result<PixelBuffer> {
    let compressed = match key {
        Some(key) => cipher_stream::decrypt_blocks(payload, key)?,
        None => payload.to_vec(),
    };
    let raw = inflate::inflate(&compressed)?;
    pixel::expand(format, width, height, &raw)
}
