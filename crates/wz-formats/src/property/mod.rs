//! WZ image property tree
//!
//! An image is a tree of named, typed properties. Scalar types are encoded
//! inline; extended types (nested lists, canvases, vectors, sounds, UOL
//! links) sit behind a u32 length prefix and a type tag so unknown regions
//! can at least be measured. The canvas decoder recurses into
//! [`parse_property_list`] for its inline child list.

pub mod string;

use tracing::trace;

use crate::canvas::WzCanvas;
use crate::context::DecodeContext;
use crate::cursor::WzCursor;
use crate::error::{Result, WzError};

/// A named node in the property tree
#[derive(Debug)]
pub struct WzProperty {
    /// Property name
    pub name: String,
    /// Property value
    pub value: WzValue,
}

/// Raw bytes of an undecoded sound property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundData {
    /// Absolute offset of the sound payload in the image slice
    pub offset: usize,
    /// Payload length in bytes
    pub len: usize,
}

/// The set of property value types found in WZ images
#[derive(Debug)]
pub enum WzValue {
    /// Type 0: no value
    Null,
    /// Types 2 and 11: 16-bit integer
    Short(i16),
    /// Types 3 and 19: compact 32-bit integer
    Int(i32),
    /// Type 20: compact 64-bit integer
    Long(i64),
    /// Type 4: 32-bit float (flag byte 0x80, else zero)
    Float(f32),
    /// Type 5: 64-bit float
    Double(f64),
    /// Type 8: masked string
    String(String),
    /// Extended `Shape2D#Vector2D`: a 2D point
    Vector {
        /// X coordinate
        x: i32,
        /// Y coordinate
        y: i32,
    },
    /// Extended `Shape2D#Convex2D`: a list of nested extended values
    Convex(Vec<WzValue>),
    /// Extended `Sound_DX8`: payload kept as a byte range, not decoded
    Sound(SoundData),
    /// Extended `UOL`: a relative link to another property
    Uol(String),
    /// Extended `Property`: a nested property list
    Sub(Vec<WzProperty>),
    /// Extended `Canvas`: a bitmap with optional children
    Canvas(WzCanvas),
}

/// Parse a property list at the cursor
///
/// Layout: compact count, then per entry a string-block name, a type byte
/// and the type-dependent value. Consumes exactly the list's own extent.
pub fn parse_property_list(
    cursor: &mut WzCursor<'_>,
    ctx: DecodeContext<'_>,
) -> Result<Vec<WzProperty>> {
    let count = cursor.read_wz_int()?;
    let count = usize::try_from(count)
        .map_err(|_| WzError::CorruptData(format!("negative property count {count}")))?;

    let mut properties = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let name = string::read_string_block(cursor, ctx.key)?;
        let type_byte = cursor.read_u8()?;
        trace!(name = %name, type_byte, "parsing property");
        let value = parse_value(cursor, ctx, type_byte)?;
        properties.push(WzProperty { name, value });
    }
    Ok(properties)
}

fn parse_value(cursor: &mut WzCursor<'_>, ctx: DecodeContext<'_>, type_byte: u8) -> Result<WzValue> {
    match type_byte {
        0 => Ok(WzValue::Null),
        2 | 11 => Ok(WzValue::Short(cursor.read_i16_le()?)),
        3 | 19 => Ok(WzValue::Int(cursor.read_wz_int()?)),
        20 => Ok(WzValue::Long(cursor.read_wz_long()?)),
        4 => {
            let value = if cursor.read_u8()? == 0x80 {
                cursor.read_f32_le()?
            } else {
                0.0
            };
            Ok(WzValue::Float(value))
        }
        5 => Ok(WzValue::Double(cursor.read_f64_le()?)),
        8 => Ok(WzValue::String(string::read_string_block(cursor, ctx.key)?)),
        9 => parse_extended(cursor, ctx),
        other => Err(WzError::UnknownPropertyType(other)),
    }
}

/// Parse an extended (type 9) value: u32 extent, tag, body, then seek to
/// the declared end whatever the body consumed.
fn parse_extended(cursor: &mut WzCursor<'_>, ctx: DecodeContext<'_>) -> Result<WzValue> {
    let len = cursor.read_u32_le()? as usize;
    let end = cursor.position() + len;
    let value = parse_extended_body(cursor, ctx, Some(end))?;
    cursor.seek(end)?;
    Ok(value)
}

fn parse_extended_body(
    cursor: &mut WzCursor<'_>,
    ctx: DecodeContext<'_>,
    end: Option<usize>,
) -> Result<WzValue> {
    let tag = string::read_string_block(cursor, ctx.key)?;
    match tag.as_str() {
        "Property" => {
            cursor.skip(2)?;
            Ok(WzValue::Sub(parse_property_list(cursor, ctx)?))
        }
        "Canvas" => Ok(WzValue::Canvas(WzCanvas::parse(cursor, ctx)?)),
        "Shape2D#Vector2D" => Ok(WzValue::Vector {
            x: cursor.read_wz_int()?,
            y: cursor.read_wz_int()?,
        }),
        "Shape2D#Convex2D" => {
            let count = cursor.read_wz_int()?;
            let count = usize::try_from(count)
                .map_err(|_| WzError::CorruptData(format!("negative convex count {count}")))?;
            let mut entries = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                // Convex entries are bare extended bodies, with no extent
                // of their own.
                entries.push(parse_extended_body(cursor, ctx, None)?);
            }
            Ok(WzValue::Convex(entries))
        }
        "Sound_DX8" => {
            let end = end.ok_or_else(|| {
                WzError::CorruptData("sound property without a declared extent".to_string())
            })?;
            let offset = cursor.position();
            let len = end.checked_sub(offset).ok_or_else(|| {
                WzError::CorruptData("sound extent ends before its payload".to_string())
            })?;
            cursor.skip(len)?;
            Ok(WzValue::Sound(SoundData { offset, len }))
        }
        "UOL" => {
            cursor.skip(1)?;
            Ok(WzValue::Uol(string::read_string_block(cursor, ctx.key)?))
        }
        _ => Err(WzError::UnknownExtendedType(tag)),
    }
}
