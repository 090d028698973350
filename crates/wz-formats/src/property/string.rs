//! WZ string decoding
//!
//! Strings are stored masked: a rolling XOR mask starting at 0xAA (8-bit
//! strings) or 0xAAAA (UTF-16 strings) and incrementing per unit, plus the
//! archive keystream when the archive is encrypted. A signed length byte
//! selects the width and, via a sentinel, whether the length itself is
//! widened to an i32.

use wz_crypto::WzKeyStream;

use crate::cursor::WzCursor;
use crate::error::{Result, WzError};

/// Inline-string tags of a string block
const INLINE_TAGS: [u8; 2] = [0x00, 0x73];
/// Offset-string tags of a string block
const OFFSET_TAGS: [u8; 2] = [0x01, 0x1B];

/// Read a masked string at the cursor
pub fn read_string(cursor: &mut WzCursor<'_>, key: Option<&WzKeyStream>) -> Result<String> {
    let len = cursor.read_i8()?;
    if len == 0 {
        return Ok(String::new());
    }

    if len > 0 {
        let units = if len == 127 {
            checked_len(cursor.read_i32_le()?)?
        } else {
            len as usize
        };
        read_utf16(cursor, key, units)
    } else {
        let bytes = if len == i8::MIN {
            checked_len(cursor.read_i32_le()?)?
        } else {
            (-i32::from(len)) as usize
        };
        read_8bit(cursor, key, bytes)
    }
}

/// Read a string block: either an inline string or a u32 offset to a string
/// stored elsewhere in the image
///
/// Offset reads go through a forked cursor; the main cursor only advances
/// past the tag and the offset itself.
pub fn read_string_block(cursor: &mut WzCursor<'_>, key: Option<&WzKeyStream>) -> Result<String> {
    let tag = cursor.read_u8()?;
    if INLINE_TAGS.contains(&tag) {
        read_string(cursor, key)
    } else if OFFSET_TAGS.contains(&tag) {
        let offset = cursor.read_u32_le()? as usize;
        let mut at = cursor.fork_at(offset)?;
        read_string(&mut at, key)
    } else {
        Err(WzError::InvalidString(format!(
            "unknown string block tag 0x{tag:02X}"
        )))
    }
}

fn checked_len(len: i32) -> Result<usize> {
    usize::try_from(len)
        .map_err(|_| WzError::InvalidString(format!("negative widened string length {len}")))
}

fn read_8bit(cursor: &mut WzCursor<'_>, key: Option<&WzKeyStream>, len: usize) -> Result<String> {
    let mut bytes = cursor.read_bytes(len)?.to_vec();

    let mut mask: u8 = 0xAA;
    for b in &mut bytes {
        *b ^= mask;
        mask = mask.wrapping_add(1);
    }
    if let Some(key) = key {
        key.apply_keystream(&mut bytes);
    }

    String::from_utf8(bytes).map_err(|e| WzError::InvalidString(e.to_string()))
}

fn read_utf16(cursor: &mut WzCursor<'_>, key: Option<&WzKeyStream>, units: usize) -> Result<String> {
    let mut bytes = cursor.read_bytes(units * 2)?.to_vec();
    if let Some(key) = key {
        key.apply_keystream(&mut bytes);
    }

    let mut mask: u16 = 0xAAAA;
    let mut decoded = Vec::with_capacity(units);
    for pair in bytes.chunks_exact(2) {
        decoded.push(u16::from_le_bytes([pair[0], pair[1]]) ^ mask);
        mask = mask.wrapping_add(1);
    }

    String::from_utf16(&decoded).map_err(|e| WzError::InvalidString(e.to_string()))
}
