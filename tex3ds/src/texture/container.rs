//! Tex3DS container header serialization.

use crate::atlas::SubImage;
use crate::encode::PixelFormat;

/// Append the container header: sub-texture count, packed texture
/// parameters, format tag, mipmap count, and one record per sub-image.
///
/// All fields are little-endian. `width` and `height` must be powers of
/// two in [8, 1024]; sub-image UVs are stored as `uv * 1024` in u16.
pub(crate) fn write_header(
    out: &mut Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    mipmap_levels: u8,
    cubemap: bool,
    subimages: &[SubImage],
) {
    debug_assert!(width.is_power_of_two() && (8..=1024).contains(&width));
    debug_assert!(height.is_power_of_two() && (8..=1024).contains(&height));

    out.extend_from_slice(&(subimages.len() as u16).to_le_bytes());

    let w_log = width.ilog2() as u8;
    let h_log = height.ilog2() as u8;

    let mut texture_params = 0u8;
    texture_params |= w_log - 3;
    texture_params |= (h_log - 3) << 3;
    if cubemap {
        texture_params |= 1 << 6;
    }

    out.push(texture_params);
    out.push(format.tag());
    out.push(mipmap_levels);

    for sub in subimages {
        let (sub_width, sub_height) = if sub.rotated() {
            (
                ((sub.right - sub.left) * height as f32) as u16,
                ((sub.bottom - sub.top) * width as f32) as u16,
            )
        } else {
            (
                ((sub.right - sub.left) * width as f32) as u16,
                ((sub.top - sub.bottom) * height as f32) as u16,
            )
        };

        out.extend_from_slice(&sub_width.to_le_bytes());
        out.extend_from_slice(&sub_height.to_le_bytes());
        for uv in [sub.left, sub.top, sub.right, sub.bottom] {
            out.extend_from_slice(&((uv * 1024.0) as u16).to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(left: f32, top: f32, right: f32, bottom: f32) -> SubImage {
        SubImage {
            index: 0,
            name: String::new(),
            left,
            top,
            right,
            bottom,
        }
    }

    #[test]
    fn test_header_fixed_fields() {
        let mut out = Vec::new();
        write_header(&mut out, 512, 256, PixelFormat::Rgb565, 3, false, &[]);

        assert_eq!(out.len(), 5);
        assert_eq!(&out[0..2], &[0, 0], "no sub-textures");

        // log2(512) - 3 = 6, log2(256) - 3 = 5.
        assert_eq!(out[2], 6 | (5 << 3));
        assert_eq!(out[3], 0x03, "format tag");
        assert_eq!(out[4], 3, "mipmap levels");
    }

    #[test]
    fn test_cubemap_flag() {
        let mut out = Vec::new();
        write_header(&mut out, 8, 8, PixelFormat::Rgba8888, 0, true, &[]);
        assert_eq!(out[2], 1 << 6);
    }

    #[test]
    fn test_subimage_record() {
        let mut out = Vec::new();
        write_header(
            &mut out,
            32,
            16,
            PixelFormat::Rgba8888,
            0,
            false,
            &[sub(0.0, 1.0, 0.5, 0.0)],
        );

        assert_eq!(u16::from_le_bytes([out[0], out[1]]), 1);
        assert_eq!(out.len(), 5 + 12);

        let record = &out[5..];
        assert_eq!(u16::from_le_bytes([record[0], record[1]]), 16, "width");
        assert_eq!(u16::from_le_bytes([record[2], record[3]]), 16, "height");
        assert_eq!(u16::from_le_bytes([record[4], record[5]]), 0, "left");
        assert_eq!(u16::from_le_bytes([record[6], record[7]]), 1024, "top");
        assert_eq!(u16::from_le_bytes([record[8], record[9]]), 512, "right");
        assert_eq!(u16::from_le_bytes([record[10], record[11]]), 0, "bottom");
    }

    #[test]
    fn test_rotated_record_swaps_extents() {
        // Rotated region (top < bottom) covering the left half of a
        // 32x16 canvas, 8 wide and 16 tall on screen.
        let mut out = Vec::new();
        write_header(
            &mut out,
            32,
            16,
            PixelFormat::Rgba8888,
            0,
            false,
            &[sub(0.0, 0.0, 0.5, 1.0)],
        );

        let record = &out[5..];
        // width from the horizontal UV span against the canvas height.
        assert_eq!(u16::from_le_bytes([record[0], record[1]]), 8);
        // height from the vertical span against the canvas width.
        assert_eq!(u16::from_le_bytes([record[2], record[3]]), 32);
    }
}
