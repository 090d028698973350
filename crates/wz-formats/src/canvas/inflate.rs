//! Inflate adapter for canvas payloads
//!
//! Canvas payloads are DEFLATE streams. Depending on how the archive was
//! produced, the payload either still carries the 2-byte zlib header or had
//! it stripped ahead of time; that is a fixed build choice, selected by the
//! `raw-deflate` cargo feature, never detected per record.

use std::io::Read;

use flate2::read::DeflateDecoder;
use tracing::trace;

use crate::error::{Result, WzError};

/// Leading bytes to drop before the raw DEFLATE stream begins.
///
/// Default build: the payload includes the zlib header, skip it. With the
/// `raw-deflate` feature the producer already stripped it.
const HEADER_OFFSET: usize = if cfg!(feature = "raw-deflate") { 0 } else { 2 };

/// Decompress a canvas payload
///
/// Failure is a [`WzError::CorruptData`]; no partial output is returned.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    let body = data.get(HEADER_OFFSET..).ok_or_else(|| {
        WzError::CorruptData(format!(
            "payload of {} bytes is shorter than the {HEADER_OFFSET}-byte header",
            data.len()
        ))
    })?;

    let mut decoder = DeflateDecoder::new(body);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| WzError::CorruptData(format!("inflate failed: {e}")))?;

    trace!(compressed = data.len(), inflated = out.len(), "inflated canvas payload");
    Ok(out)
}
