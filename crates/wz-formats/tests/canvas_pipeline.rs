//! End-to-end canvas decoding over synthetic records
//!
//! Builds byte-exact canvas records the way a producer would (child list,
//! header fields, zlib payload, optional cipher block stream) and runs them
//! through the full pipeline in both decode modes.

// The payload builders emit a zlib header, which is the default framing.
#![cfg(not(feature = "raw-deflate"))]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use pretty_assertions::assert_eq;
use wz_crypto::{WzKeyStream, WzVariant};
use wz_formats::{DecodeContext, PixelLayout, WzCanvas, WzCursor, WzError, WzValue};

fn compress(pixels: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(pixels).unwrap();
    encoder.finish().unwrap()
}

/// Split `data` into a cipher block stream with the given block sizes.
fn encrypt_blocks(data: &[u8], key: &WzKeyStream, sizes: &[usize]) -> Vec<u8> {
    assert_eq!(sizes.iter().sum::<usize>(), data.len());
    let mut out = Vec::new();
    let mut off = 0;
    for &len in sizes {
        out.extend_from_slice(&(len as i32).to_le_bytes());
        out.extend_from_slice(&key.decrypt(&data[off..off + len]));
        off += len;
    }
    out
}

fn encode_wz_int(value: i32) -> Vec<u8> {
    if (-127..=127).contains(&value) {
        vec![value as u8]
    } else {
        let mut out = vec![0x80];
        out.extend_from_slice(&value.to_le_bytes());
        out
    }
}

fn encode_name(s: &str) -> Vec<u8> {
    // Inline string block, 8-bit, unencrypted mask only.
    let mut out = vec![0x00, (-(s.len() as i8)) as u8];
    let mut mask: u8 = 0xAA;
    for &b in s.as_bytes() {
        out.push(b ^ mask);
        mask = mask.wrapping_add(1);
    }
    out
}

/// Assemble a canvas record. `child_list` is the raw property-list bytes.
fn build_record(
    child_list: Option<&[u8]>,
    width: i32,
    height: i32,
    format1: i32,
    format2: u8,
    payload: &[u8],
) -> Vec<u8> {
    let mut out = vec![0x00]; // reserved
    match child_list {
        Some(list) => {
            out.push(0x01);
            out.extend_from_slice(&[0x00, 0x00]); // reserved
            out.extend_from_slice(list);
        }
        None => out.push(0x00),
    }
    out.extend_from_slice(&encode_wz_int(width));
    out.extend_from_slice(&encode_wz_int(height));
    out.extend_from_slice(&encode_wz_int(format1));
    out.push(format2);
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&((payload.len() + 1) as i32).to_le_bytes());
    out.push(0x00); // flag byte
    out.extend_from_slice(payload);
    out
}

#[test]
fn eager_argb8888_decode() {
    let pixels: Vec<u8> = (0..64).collect(); // 4x4 ARGB
    let record = build_record(None, 4, 4, 2, 0, &compress(&pixels));

    let mut cursor = WzCursor::new(&record);
    let canvas = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).expect("decode");
    assert!(cursor.is_at_end());

    let buffer = canvas.pixels().expect("eager decode resolves");
    assert_eq!(buffer.width(), 4);
    assert_eq!(buffer.height(), 4);
    assert_eq!(buffer.stride(), 16);
    assert_eq!(buffer.layout(), PixelLayout::Argb8888);
    assert_eq!(buffer.data(), pixels.as_slice());
}

#[test]
fn eager_argb4444_nibble_expansion() {
    // One pixel, low nibble 0xF: channel bytes (0xFF, 0x00).
    let record = build_record(None, 1, 1, 1, 0, &compress(&[0x0F, 0x00]));

    let mut cursor = WzCursor::new(&record);
    let canvas = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).expect("decode");
    assert_eq!(canvas.pixels().unwrap().data(), &[0xFF, 0x00, 0x00, 0x00]);
}

#[test]
fn format_code_is_summed_from_both_parts() {
    // 511 + 2 = 513, RGB565.
    let pixels = vec![0xAB; 4 * 4 * 2];
    let record = build_record(None, 4, 4, 511, 2, &compress(&pixels));

    let mut cursor = WzCursor::new(&record);
    let canvas = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).expect("decode");
    assert_eq!(canvas.format(), 513);
    let buffer = canvas.pixels().unwrap();
    assert_eq!(buffer.layout(), PixelLayout::Rgb565);
    assert_eq!(buffer.data(), pixels.as_slice());
}

#[test]
fn encrypted_record_matches_plain_decode() {
    let key = WzKeyStream::new(WzVariant::Gms.iv());
    let pixels: Vec<u8> = (0..=255).cycle().take(8 * 8 * 4).collect();
    let compressed = compress(&pixels);

    // Uneven block sizes to exercise the framing.
    let mut sizes = Vec::new();
    let mut left = compressed.len();
    while left > 0 {
        let take = left.min(7);
        sizes.push(take);
        left -= take;
    }
    let record_plain = build_record(None, 8, 8, 2, 0, &compressed);
    let record_enc = build_record(None, 8, 8, 2, 0, &encrypt_blocks(&compressed, &key, &sizes));

    let mut cursor = WzCursor::new(&record_plain);
    let plain = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).expect("plain decode");

    let mut cursor = WzCursor::new(&record_enc);
    let enc =
        WzCanvas::parse(&mut cursor, DecodeContext::eager(Some(&key))).expect("encrypted decode");

    assert_eq!(enc.pixels().unwrap(), plain.pixels().unwrap());
}

#[test]
fn lazy_then_resolve_equals_eager() {
    let key = WzKeyStream::new(WzVariant::Ems.iv());
    let pixels = vec![0x3C; 4 * 2 * 4];
    let compressed = compress(&pixels);
    let record = build_record(
        None,
        4,
        2,
        2,
        0,
        &encrypt_blocks(&compressed, &key, &[compressed.len()]),
    );

    let mut cursor = WzCursor::new(&record);
    let mut lazy =
        WzCanvas::parse(&mut cursor, DecodeContext::lazy(Some(&key))).expect("lazy parse");
    // Lazy parse advances past the payload without decoding it.
    assert!(cursor.is_at_end());
    assert!(lazy.pixels().is_none());
    assert!(lazy.byte_range().is_some());

    let mut cursor = WzCursor::new(&record);
    let eager =
        WzCanvas::parse(&mut cursor, DecodeContext::eager(Some(&key))).expect("eager parse");

    let resolved = lazy.resolve(&record, Some(&key)).expect("resolve").clone();
    assert_eq!(&resolved, eager.pixels().unwrap());

    // Resolving again is a no-op returning the same buffer.
    assert_eq!(lazy.resolve(&record, Some(&key)).unwrap(), &resolved);
}

#[test]
fn children_parsed_and_adopted() {
    let mut list = vec![2u8];
    list.extend_from_slice(&encode_name("z"));
    list.push(3); // compact int
    list.push(5);
    list.extend_from_slice(&encode_name("flip"));
    list.push(3);
    list.push(1);

    let pixels = vec![0u8; 2 * 2 * 4];
    let record = build_record(Some(&list), 2, 2, 2, 0, &compress(&pixels));

    let mut cursor = WzCursor::new(&record);
    let canvas = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).expect("decode");
    assert!(cursor.is_at_end());

    assert_eq!(canvas.children.len(), 2);
    assert_eq!(canvas.children[0].name, "z");
    assert!(matches!(canvas.children[0].value, WzValue::Int(5)));
    assert_eq!(canvas.children[1].name, "flip");
    assert!(canvas.pixels().is_some());
}

#[test]
fn reparse_does_not_duplicate_children() {
    let mut list = vec![1u8];
    list.extend_from_slice(&encode_name("origin"));
    list.push(3);
    list.push(0);

    let record = build_record(Some(&list), 2, 2, 2, 0, &compress(&vec![0u8; 16]));

    let mut cursor = WzCursor::new(&record);
    let mut canvas = WzCanvas::parse(&mut cursor, DecodeContext::lazy(None)).expect("first parse");
    assert_eq!(canvas.children.len(), 1);

    // Re-entering the same header must leave the child list alone.
    let mut cursor = WzCursor::new(&record);
    canvas
        .parse_into(&mut cursor, DecodeContext::lazy(None))
        .expect("second parse");
    assert_eq!(canvas.children.len(), 1);
}

#[test]
fn unsupported_format_carries_code() {
    let record = build_record(None, 4, 4, 999, 0, &compress(&[0u8; 8]));

    let mut cursor = WzCursor::new(&record);
    let err = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).unwrap_err();
    assert!(matches!(err, WzError::UnsupportedFormat(999)));
}

#[test]
fn truncated_payload_is_truncated_record() {
    let mut record = build_record(None, 4, 4, 2, 0, &compress(&vec![0u8; 64]));
    record.truncate(record.len() - 5);

    let mut cursor = WzCursor::new(&record);
    let err = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).unwrap_err();
    assert!(matches!(err, WzError::TruncatedRecord { .. }));

    // Lazy mode hits the same wall when skipping.
    let mut cursor = WzCursor::new(&record);
    let err = WzCanvas::parse(&mut cursor, DecodeContext::lazy(None)).unwrap_err();
    assert!(matches!(err, WzError::TruncatedRecord { .. }));
}

#[test]
fn pixel_length_mismatch_is_fatal() {
    // Declares 4x4 ARGB8888 but carries one byte short.
    let record = build_record(None, 4, 4, 2, 0, &compress(&vec![0u8; 63]));

    let mut cursor = WzCursor::new(&record);
    let err = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).unwrap_err();
    assert!(matches!(
        err,
        WzError::FormatMismatch {
            format: 2,
            expected: 64,
            actual: 63,
            ..
        }
    ));
}

#[test]
fn garbage_compression_is_corrupt_data() {
    let record = build_record(None, 4, 4, 2, 0, &[0x78, 0x9C, 0xFF, 0xFF, 0xFF, 0xFF]);

    let mut cursor = WzCursor::new(&record);
    let err = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).unwrap_err();
    assert!(matches!(err, WzError::CorruptData(_)));
}

#[test]
fn cipher_framing_must_fill_declared_range() {
    let key = WzKeyStream::new(WzVariant::Gms.iv());
    let compressed = compress(&vec![0u8; 16]);
    let mut stream = encrypt_blocks(&compressed, &key, &[compressed.len()]);
    stream.push(0xAB); // one trailing byte the framing cannot account for
    let record = build_record(None, 2, 2, 2, 0, &stream);

    let mut cursor = WzCursor::new(&record);
    let err = WzCanvas::parse(&mut cursor, DecodeContext::eager(Some(&key))).unwrap_err();
    assert!(matches!(err, WzError::CorruptCipherStream(_)));
}

#[test]
fn mono_record_end_to_end() {
    // 16x8 canvas, one payload byte: bit 7 paints the first row white.
    let record = build_record(None, 16, 8, 517, 0, &compress(&[0x80]));

    let mut cursor = WzCursor::new(&record);
    let canvas = WzCanvas::parse(&mut cursor, DecodeContext::eager(None)).expect("decode");
    let buffer = canvas.pixels().unwrap();
    assert_eq!(buffer.layout(), PixelLayout::GrayArgb8888);
    assert_eq!(&buffer.data()[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
    assert_eq!(&buffer.data()[16 * 4..16 * 4 + 4], &[0x00, 0x00, 0x00, 0xFF]);
}
