//! Decode configuration threaded through the parsers

use wz_crypto::WzKeyStream;

/// Whether canvas payloads are decoded on sight or skipped for later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Decode canvas payloads into pixel buffers immediately
    Eager,
    /// Record the payload byte range and advance past it; decode on
    /// [`resolve`](crate::canvas::WzCanvas::resolve)
    Lazy,
}

/// Per-image decode settings
///
/// `key` is `None` for unencrypted archives; when present it drives both
/// string decoding and canvas payload decryption.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'k> {
    /// Archive keystream, if the archive is encrypted
    pub key: Option<&'k WzKeyStream>,
    /// Canvas decode mode
    pub mode: DecodeMode,
}

impl<'k> DecodeContext<'k> {
    /// Context that decodes canvas payloads immediately
    pub fn eager(key: Option<&'k WzKeyStream>) -> Self {
        Self {
            key,
            mode: DecodeMode::Eager,
        }
    }

    /// Context that records canvas payload ranges for later resolution
    pub fn lazy(key: Option<&'k WzKeyStream>) -> Self {
        Self {
            key,
            mode: DecodeMode::Lazy,
        }
    }

    /// Whether the archive carries encrypted payloads
    pub fn is_encrypted(&self) -> bool {
        self.key.is_some()
    }
}
