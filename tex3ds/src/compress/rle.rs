//! Run-length encoding.
//!
//! Token bytes: `0LLLLLLL` introduces `L + 1` raw bytes (1–128);
//! `1LLLLLLL` repeats the following byte `L + 3` times (3–130). Repeat
//! runs are taken whenever at least three identical bytes line up.

use super::{pad_stream, CompressError};

/// Minimum encodable repeat run.
const MIN_RUN: usize = 3;

/// Maximum repeat run length.
const MAX_RUN: usize = 130;

/// Maximum literal copy length.
const MAX_COPY: usize = 128;

/// RLE compression of `data`, including header and padding.
pub fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 16);
    super::compression_header(&mut out, 0x30, data.len());

    let mut pos = 0;
    let mut save = 0;
    let mut save_len = 0;

    while pos < data.len() {
        // Length of the repeat run starting here.
        let mut run = 1;
        while pos + run < data.len() && run < MAX_RUN && data[pos + run] == data[pos] {
            run += 1;
        }

        if run < MIN_RUN {
            // Too short to encode; accumulate into the pending literal.
            pos += 1;
            save_len += 1;
        }

        if save_len == MAX_COPY || (save_len > 0 && run > 2) {
            out.push((save_len - 1) as u8);
            out.extend_from_slice(&data[save..save + save_len]);
            save += save_len;
            save_len = 0;
        }

        if run > 2 {
            out.push((0x80 | (run - MIN_RUN)) as u8);
            out.push(data[pos]);
            pos += run;
            save = pos;
            debug_assert_eq!(save_len, 0);
        }
    }

    debug_assert_eq!(save + save_len, data.len());

    if save_len > 0 {
        out.push((save_len - 1) as u8);
        out.extend_from_slice(&data[save..save + save_len]);
    }

    pad_stream(&mut out);
    out
}

/// Decode an RLE body (header already stripped) of known decompressed
/// size.
pub fn rle_decode(src: &[u8], size: usize) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::with_capacity(size);
    let mut input = src.iter().copied();
    let mut next = || input.next().ok_or(CompressError::Truncated);

    while out.len() < size {
        let token = next()?;

        if token & 0x80 != 0 {
            let len = ((token & 0x7F) as usize + 3).min(size - out.len());
            let value = next()?;
            out.extend(std::iter::repeat(value).take(len));
        } else {
            let len = ((token & 0x7F) as usize + 1).min(size - out.len());
            for _ in 0..len {
                out.push(next()?);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::decompress;

    #[test]
    fn test_literal_then_run() {
        // "ABCAAAAAA": three literals, then a six-byte repeat of 'A'.
        let data = b"ABCAAAAAA";
        let out = rle_encode(data);

        assert_eq!(&out[0..4], &[0x30, 9, 0, 0], "header");
        assert_eq!(out[4], 0x02, "literal token, length 3");
        assert_eq!(&out[5..8], b"ABC");
        assert_eq!(out[8], 0x80 | 3, "repeat token, length 6");
        assert_eq!(out[9], b'A');
        assert_eq!(out.len(), 12, "padded to 4 bytes");

        assert_eq!(decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_run_shorter_than_three_stays_literal() {
        let data = b"AABBAABB";
        let out = rle_encode(data);
        assert_eq!(out[4], 0x07, "one literal token of 8 bytes");
        assert_eq!(decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_long_run_splits_at_130() {
        let data = vec![9u8; 300];
        let out = rle_encode(&data);

        // 300 = 130 + 130 + 40, three repeat tokens.
        assert_eq!(out[4], 0x80 | 127);
        assert_eq!(out[5], 9);
        assert_eq!(out[6], 0x80 | 127);
        assert_eq!(out[7], 9);
        assert_eq!(out[8], 0x80 | 37);
        assert_eq!(out[9], 9);

        assert_eq!(decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_literal_splits_at_128() {
        // 200 distinct bytes: literal tokens of 128 and 72.
        let data: Vec<u8> = (0..200u8).collect();
        let out = rle_encode(&data);

        assert_eq!(out[4], 127);
        assert_eq!(out[4 + 1 + 128], 71);
        assert_eq!(decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_mixed_content_roundtrip() {
        let mut data = Vec::new();
        for i in 0..50usize {
            data.extend(std::iter::repeat((i % 256) as u8).take(i % 9 + 1));
            data.push(255 - (i as u8));
        }
        let out = rle_encode(&data);
        assert_eq!(decompress(&out).unwrap(), data);
    }

    #[test]
    fn test_empty_input() {
        let out = rle_encode(&[]);
        assert_eq!(&out[0..4], &[0x30, 0, 0, 0]);
        assert_eq!(decompress(&out).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(rle_decode(&[0x85], 10).unwrap_err(), CompressError::Truncated);
    }
}
