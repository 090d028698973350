//! Parsers for WZ archive image data
//!
//! A WZ image is a tree of typed properties; canvas properties carry
//! compressed, optionally block-encrypted bitmaps in a family of compact
//! pixel encodings. This crate parses the property tree and implements the
//! full canvas decode pipeline: cipher block stream removal, DEFLATE, and
//! bit-exact pixel expansion into a canonical buffer.
//!
//! # Decoding a canvas
//!
//! ```no_run
//! use wz_crypto::{WzKeyStream, WzVariant};
//! use wz_formats::{DecodeContext, WzCanvas, WzCursor};
//!
//! # fn main() -> wz_formats::Result<()> {
//! let image: Vec<u8> = std::fs::read("stand.img").expect("image bytes");
//! let key = WzKeyStream::new(WzVariant::Gms.iv());
//!
//! let mut cursor = WzCursor::new(&image);
//! let mut canvas = WzCanvas::parse(&mut cursor, DecodeContext::lazy(Some(&key)))?;
//!
//! // Later, against an independent view of the same bytes:
//! let pixels = canvas.resolve(&image, Some(&key))?;
//! println!("{}x{}, stride {}", pixels.width(), pixels.height(), pixels.stride());
//! # Ok(())
//! # }
//! ```
//!
//! # Design notes
//!
//! - Decoding is strict: truncated records, inconsistent cipher framing,
//!   bad DEFLATE streams, payload-length mismatches and unknown format
//!   codes are all fatal. No partial pixel buffer is ever returned.
//! - The inflate framing (whether payloads still carry the 2-byte zlib
//!   header) is a build-time choice via the `raw-deflate` feature, mirroring
//!   the producers' build split; it is never detected per record.

#![warn(missing_docs)]

pub mod canvas;
mod context;
pub mod cursor;
pub mod error;
pub mod property;

pub use canvas::{CanvasFormat, CanvasState, PixelBuffer, PixelLayout, WzCanvas};
pub use context::{DecodeContext, DecodeMode};
pub use cursor::WzCursor;
pub use error::{Result, WzError};
pub use property::{SoundData, WzProperty, WzValue, parse_property_list};
