//! Error types for WZ image parsing

use thiserror::Error;

/// Errors that can occur while parsing WZ image data
#[derive(Debug, Error)]
pub enum WzError {
    /// The cursor ran out of bytes before a requested read completed.
    ///
    /// Always fatal: the image is truncated or a prior parse step left the
    /// cursor mis-positioned. Reads never pad.
    #[error("truncated record: needed {expected} more bytes, {remaining} remain")]
    TruncatedRecord {
        /// Bytes the read requested
        expected: usize,
        /// Bytes left in the slice
        remaining: usize,
    },

    /// Cipher block framing inconsistent with the remaining bytes
    #[error("corrupt cipher block stream: {0}")]
    CorruptCipherStream(String),

    /// Decompression rejected the payload
    #[error("corrupt canvas data: {0}")]
    CorruptData(String),

    /// Decompressed byte count does not match the format's expected formula
    #[error(
        "pixel data mismatch for format {format}: expected {expected} bytes for \
         {width}x{height}, got {actual}"
    )]
    FormatMismatch {
        /// Canvas format code
        format: i32,
        /// Declared width
        width: u32,
        /// Declared height
        height: u32,
        /// Byte count the format formula requires
        expected: usize,
        /// Byte count actually decompressed
        actual: usize,
    },

    /// Canvas format code outside the known set
    #[error("unsupported canvas format {0}")]
    UnsupportedFormat(i32),

    /// Unknown property type byte in a property list
    #[error("unknown property type 0x{0:02X}")]
    UnknownPropertyType(u8),

    /// Unknown extended property type tag
    #[error("unknown extended property type {0:?}")]
    UnknownExtendedType(String),

    /// String bytes did not decode to valid text
    #[error("invalid string data: {0}")]
    InvalidString(String),
}

/// Result type for WZ image parsing
pub type Result<T> = std::result::Result<T, WzError>;
