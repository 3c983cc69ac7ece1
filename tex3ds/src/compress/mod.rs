//! Binary compression codecs for container payloads.
//!
//! All codecs share the GBA-style stream layout: a header carrying the
//! codec type and the uncompressed size, the codec-specific body, then
//! zero padding to a 4-byte boundary.
//!
//! Header forms:
//! - short: `[type, size, size >> 8, size >> 16]` for sizes below 2²⁴
//! - long: `[type | 0x80, size, size >> 8, size >> 16, size >> 24, 0, 0, 0]`
//!   (four-byte size plus three reserved bytes)
//!
//! Type bytes: 0x00 none, 0x10 LZ10, 0x11 LZ11, 0x28 Huffman, 0x30 RLE.

mod huffman;
mod lzss;
mod rle;

pub use huffman::{huff_decode, huff_encode};
pub use lzss::{lz10_decode, lz10_encode, lz11_decode, lz11_encode};
pub use rle::{rle_decode, rle_encode};

use thiserror::Error;
use tracing::warn;

/// Codec selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionFormat {
    /// Header plus the raw payload.
    None,
    /// LZSS with 3–18 byte matches.
    Lz10,
    /// LZSS with extended match lengths up to 65808 bytes.
    Lz11,
    /// Run-length encoding.
    Rle,
    /// Canonical byte-alphabet Huffman.
    Huffman,
    /// Smallest output of all codecs.
    #[default]
    Auto,
}

/// Errors surfaced while parsing a compressed stream.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompressError {
    #[error("Unknown compression type 0x{0:02X}")]
    UnknownType(u8),
    #[error("Compressed stream is truncated")]
    Truncated,
}

/// Append a stream header for `ty` and the uncompressed `size`.
pub(crate) fn compression_header(out: &mut Vec<u8>, ty: u8, size: usize) {
    if size >= 1 << 24 {
        // The 24-bit size field overflows; historical consumers may not
        // understand the long form.
        warn!(size, "uncompressed size exceeds 24-bit header field, using long header");

        out.push(ty | 0x80);
        out.extend_from_slice(&(size as u32).to_le_bytes());
        out.extend_from_slice(&[0, 0, 0]);
    } else {
        out.push(ty);
        out.push(size as u8);
        out.push((size >> 8) as u8);
        out.push((size >> 16) as u8);
    }
}

/// Pad a stream to a 4-byte boundary with zeros.
pub(crate) fn pad_stream(out: &mut Vec<u8>) {
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// "Compress" by attaching the header to the raw payload.
pub fn compress_none(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + 8);
    compression_header(&mut out, 0x00, data.len());
    out.extend_from_slice(data);
    pad_stream(&mut out);
    out
}

/// Compress with the requested codec.
///
/// `Auto` runs every codec and keeps the smallest output; ties keep the
/// earliest codec in the order none, LZ10, LZ11, RLE, Huffman. The Huffman
/// candidate is accepted only if it decodes back to the input, so a codec
/// regression can cost ratio but never correctness.
pub fn compress(data: &[u8], format: CompressionFormat) -> Vec<u8> {
    match format {
        CompressionFormat::None => compress_none(data),
        CompressionFormat::Lz10 => lz10_encode(data),
        CompressionFormat::Lz11 => lz11_encode(data),
        CompressionFormat::Rle => rle_encode(data),
        CompressionFormat::Huffman => huff_encode(data),
        CompressionFormat::Auto => compress_auto(data),
    }
}

fn compress_auto(data: &[u8]) -> Vec<u8> {
    let mut best = compress_none(data);

    for encode in [lz10_encode, lz11_encode, rle_encode] {
        let candidate = encode(data);
        if candidate.len() < best.len() {
            best = candidate;
        }
    }

    let huffman = huff_encode(data);
    if huffman.len() < best.len() {
        match decompress(&huffman) {
            Ok(roundtrip) if roundtrip == data => best = huffman,
            _ => warn!("Huffman candidate failed verification, falling back"),
        }
    }

    best
}

/// Parse a stream header, returning (type, uncompressed size, body).
fn parse_header(data: &[u8]) -> Result<(u8, usize, &[u8]), CompressError> {
    if data.len() < 4 {
        return Err(CompressError::Truncated);
    }

    let ty = data[0];
    if ty & 0x80 != 0 {
        if data.len() < 8 {
            return Err(CompressError::Truncated);
        }
        let size = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize;
        Ok((ty & 0x7F, size, &data[8..]))
    } else {
        let size = data[1] as usize | (data[2] as usize) << 8 | (data[3] as usize) << 16;
        Ok((ty, size, &data[4..]))
    }
}

/// Decompress any stream produced by [`compress`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CompressError> {
    let (ty, size, body) = parse_header(data)?;

    match ty {
        0x00 => {
            if body.len() < size {
                return Err(CompressError::Truncated);
            }
            Ok(body[..size].to_vec())
        }
        0x10 => lz10_decode(body, size),
        0x11 => lz11_decode(body, size),
        0x28 => huff_decode(body, size),
        0x30 => rle_decode(body, size),
        other => Err(CompressError::UnknownType(other)),
    }
}
