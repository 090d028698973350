//! Binary cursor over an image slice
//!
//! All WZ image parsing runs off one of these. Every read is bounds-checked
//! against the slice; a short read is a [`WzError::TruncatedRecord`], never
//! a silent pad. Positions are absolute offsets into the image slice, which
//! is also what the deduplicated-string offsets in property lists refer to.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Result, WzError};

/// Sentinel byte of the compact signed-integer encoding: the value is
/// carried in a following 4-byte (or 8-byte) little-endian integer instead.
const WZ_INT_SENTINEL: i8 = i8::MIN;

/// Bounds-checked reader over a WZ image slice
#[derive(Debug, Clone)]
pub struct WzCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WzCursor<'a> {
    /// Create a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current absolute position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left before the end of the slice
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Whether the cursor has reached the end of the slice
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Move to an absolute position
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(WzError::TruncatedRecord {
                expected: pos - self.pos,
                remaining: self.remaining(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance past `n` bytes without reading them
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// A second cursor over the same slice, positioned at `pos`
    ///
    /// Used for offset-addressed string blocks; the original cursor keeps
    /// its position.
    pub fn fork_at(&self, pos: usize) -> Result<WzCursor<'a>> {
        let mut fork = Self::new(self.data);
        fork.seek(pos)?;
        Ok(fork)
    }

    /// Consume `n` bytes, failing if fewer remain
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(WzError::TruncatedRecord {
                expected: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Read exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.take(n)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.take(1).map(|b| b[0])
    }

    /// Read one signed byte
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a little-endian `i16`
    pub fn read_i16_le(&mut self) -> Result<i16> {
        self.take(2).map(LittleEndian::read_i16)
    }

    /// Read a little-endian `i32`
    pub fn read_i32_le(&mut self) -> Result<i32> {
        self.take(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian `u32`
    pub fn read_u32_le(&mut self) -> Result<u32> {
        self.take(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian `i64`
    pub fn read_i64_le(&mut self) -> Result<i64> {
        self.take(8).map(LittleEndian::read_i64)
    }

    /// Read a little-endian `f32`
    pub fn read_f32_le(&mut self) -> Result<f32> {
        self.take(4).map(LittleEndian::read_f32)
    }

    /// Read a little-endian `f64`
    pub fn read_f64_le(&mut self) -> Result<f64> {
        self.take(8).map(LittleEndian::read_f64)
    }

    /// Read a compact signed integer
    ///
    /// One signed byte; the sentinel `-128` widens the value to a following
    /// little-endian `i32`.
    pub fn read_wz_int(&mut self) -> Result<i32> {
        let first = self.read_i8()?;
        if first == WZ_INT_SENTINEL {
            self.read_i32_le()
        } else {
            Ok(i32::from(first))
        }
    }

    /// Read a compact signed integer widened to `i64`
    pub fn read_wz_long(&mut self) -> Result<i64> {
        let first = self.read_i8()?;
        if first == WZ_INT_SENTINEL {
            self.read_i64_le()
        } else {
            Ok(i64::from(first))
        }
    }
}
