//! Cipher block stream removal
//!
//! Encrypted canvas payloads are stored as consecutive
//! `(length: i32 LE, ciphertext)` pairs with no outer length field; the
//! stream ends exactly where the enclosing record's byte range ends. Each
//! block is independently XORed with the archive keystream from offset 0.

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;
use wz_crypto::WzKeyStream;

use crate::error::{Result, WzError};

/// Strip the block-wise keystream cipher from a canvas payload
///
/// The output length equals the sum of all block lengths, i.e. the input
/// length minus 4 bytes per block. Framing that does not land exactly on
/// the end of `data` is a [`WzError::CorruptCipherStream`] — the caller's
/// slice boundary is authoritative, never a heuristic.
pub fn decrypt_blocks(data: &[u8], key: &WzKeyStream) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut pos = 0usize;

    while pos < data.len() {
        let remaining = data.len() - pos;
        if remaining < 4 {
            return Err(WzError::CorruptCipherStream(format!(
                "{remaining} trailing bytes where a block length was expected"
            )));
        }
        let len = LittleEndian::read_i32(&data[pos..pos + 4]);
        pos += 4;

        if len < 0 {
            return Err(WzError::CorruptCipherStream(format!(
                "negative block length {len}"
            )));
        }
        let len = len as usize;
        if len > data.len() - pos {
            return Err(WzError::CorruptCipherStream(format!(
                "block length {len} exceeds the {} bytes left in the stream",
                data.len() - pos
            )));
        }

        trace!(len, pos, "decrypting cipher block");
        out.extend_from_slice(&key.decrypt(&data[pos..pos + len]));
        pos += len;
    }

    Ok(out)
}
