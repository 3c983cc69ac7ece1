//! Pixel-format encoders for the fourteen PICA 200 texture formats.
//!
//! Every encoder consumes one 8×8 [`Tile`] and appends bytes to an output
//! buffer in the exact order the GPU expects. Tiles arrive post-swizzle for
//! all formats except ETC1/ETC1A4, which consume the raw raster as four 4×4
//! sub-blocks. Encoders are pure functions of the tile, which keeps them
//! trivially parallelizable.
//!
//! Each format also has a preview path that rewrites the tile with its
//! quantized colors instead of emitting bytes; the pipeline composites
//! previewed tiles back into an inspection image.

mod formats;

use crate::etc1;
use image::RgbaImage;

/// One RGBA pixel, channel order R, G, B, A.
pub type Rgba = [u8; 4];

/// An 8×8 pixel tile in row-major order, the unit of work for every
/// encoder.
#[derive(Debug, Clone)]
pub struct Tile {
    pub pixels: [Rgba; 64],
}

impl Tile {
    /// Copy the 8×8 tile whose top-left corner is `(tx, ty)` out of an
    /// image. The corner must be tile-aligned and fully inside the image.
    pub fn from_image(img: &RgbaImage, tx: u32, ty: u32) -> Self {
        debug_assert!(tx % 8 == 0 && ty % 8 == 0);
        debug_assert!(tx + 8 <= img.width() && ty + 8 <= img.height());

        let mut pixels = [[0u8; 4]; 64];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            let p = img.get_pixel(tx + (i % 8) as u32, ty + (i / 8) as u32);
            *pixel = p.0;
        }
        Self { pixels }
    }

    /// Write the tile back into an image at `(tx, ty)`. Used by the
    /// preview path.
    pub fn write_to_image(&self, img: &mut RgbaImage, tx: u32, ty: u32) {
        for (i, pixel) in self.pixels.iter().enumerate() {
            img.put_pixel(
                tx + (i % 8) as u32,
                ty + (i / 8) as u32,
                image::Rgba(*pixel),
            );
        }
    }
}

/// PICA 200 texture format, tagged exactly as stored in the container
/// header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 32-bit RGBA (bytes A, B, G, R per pixel)
    Rgba8888 = 0x00,
    /// 24-bit RGB (bytes B, G, R per pixel)
    Rgb888 = 0x01,
    /// 16-bit RGBA (5-bit RGB, 1-bit alpha)
    Rgba5551 = 0x02,
    /// 16-bit RGB (5-bit red/blue, 6-bit green)
    Rgb565 = 0x03,
    /// 16-bit RGBA (4-bit components)
    Rgba4444 = 0x04,
    /// 16-bit luminance/alpha (bytes A, L per pixel)
    La88 = 0x05,
    /// 16-bit HILO (bytes G, R per pixel)
    Hilo88 = 0x06,
    /// 8-bit luminance
    L8 = 0x07,
    /// 8-bit alpha
    A8 = 0x08,
    /// 8-bit luminance/alpha (4-bit components)
    La44 = 0x09,
    /// 4-bit luminance, two pixels per byte
    L4 = 0x0A,
    /// 4-bit alpha, two pixels per byte
    A4 = 0x0B,
    /// ETC1, four 4×4 blocks per tile
    Etc1 = 0x0C,
    /// ETC1 with a 4-bit alpha block per 4×4 sub-block
    Etc1A4 = 0x0D,
}

impl PixelFormat {
    /// Container header tag.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Bits per pixel on the wire.
    pub fn bits_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8888 => 32,
            PixelFormat::Rgb888 => 24,
            PixelFormat::Rgba5551 | PixelFormat::Rgb565 | PixelFormat::Rgba4444 => 16,
            PixelFormat::La88 | PixelFormat::Hilo88 => 16,
            PixelFormat::L8 | PixelFormat::A8 | PixelFormat::La44 => 8,
            PixelFormat::L4 | PixelFormat::A4 | PixelFormat::Etc1 => 4,
            PixelFormat::Etc1A4 => 8,
        }
    }

    /// Encoded bytes appended per 8×8 tile: `64 * bpp / 8`.
    pub fn bytes_per_tile(self) -> usize {
        64 * self.bits_per_pixel() / 8
    }

    /// ETC1 formats skip the Morton swizzle and consume the raw raster.
    pub fn is_etc1(self) -> bool {
        matches!(self, PixelFormat::Etc1 | PixelFormat::Etc1A4)
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PixelFormat::Rgba8888 => "rgba8888",
            PixelFormat::Rgb888 => "rgb888",
            PixelFormat::Rgba5551 => "rgba5551",
            PixelFormat::Rgb565 => "rgb565",
            PixelFormat::Rgba4444 => "rgba4444",
            PixelFormat::La88 => "la88",
            PixelFormat::Hilo88 => "hilo88",
            PixelFormat::L8 => "l8",
            PixelFormat::A8 => "a8",
            PixelFormat::La44 => "la44",
            PixelFormat::L4 => "l4",
            PixelFormat::A4 => "a4",
            PixelFormat::Etc1 => "etc1",
            PixelFormat::Etc1A4 => "etc1a4",
        };
        f.write_str(name)
    }
}

/// Requested format: either a concrete format or one of the auto modes
/// that commit based on the alpha content of the composed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatRequest {
    Exact(PixelFormat),
    /// L8 when the input has no alpha, otherwise LA88.
    AutoL8,
    /// L4 when the input has no alpha, otherwise LA44.
    AutoL4,
    /// ETC1 when the input has no alpha, otherwise ETC1A4.
    AutoEtc1,
}

impl FormatRequest {
    /// Commit an auto mode by scanning every pixel of the images for
    /// nonzero quantized alpha (8, 4, and 4 bits respectively).
    pub fn resolve(self, images: &[RgbaImage]) -> PixelFormat {
        match self {
            FormatRequest::Exact(format) => format,
            FormatRequest::AutoL8 => {
                if any_alpha(images, 8) {
                    PixelFormat::La88
                } else {
                    PixelFormat::L8
                }
            }
            FormatRequest::AutoL4 => {
                if any_alpha(images, 4) {
                    PixelFormat::La44
                } else {
                    PixelFormat::L4
                }
            }
            FormatRequest::AutoEtc1 => {
                if any_alpha(images, 4) {
                    PixelFormat::Etc1A4
                } else {
                    PixelFormat::Etc1
                }
            }
        }
    }
}

/// Whether any pixel carries nonzero alpha after quantization to `bits`.
fn any_alpha(images: &[RgbaImage], bits: u32) -> bool {
    images
        .iter()
        .flat_map(|img| img.pixels())
        .any(|p| crate::quant::to_bits(p.0[3], bits) != 0)
}

/// Encode one tile, appending exactly `format.bytes_per_tile()` bytes.
pub fn encode_tile(tile: &Tile, format: PixelFormat, quality: etc1::Quality, out: &mut Vec<u8>) {
    match format {
        PixelFormat::Rgba8888 => formats::rgba8888(tile, out),
        PixelFormat::Rgb888 => formats::rgb888(tile, out),
        PixelFormat::Rgba5551 => formats::rgba5551(tile, out),
        PixelFormat::Rgb565 => formats::rgb565(tile, out),
        PixelFormat::Rgba4444 => formats::rgba4444(tile, out),
        PixelFormat::La88 => formats::la88(tile, out),
        PixelFormat::Hilo88 => formats::hilo88(tile, out),
        PixelFormat::L8 => formats::l8(tile, out),
        PixelFormat::A8 => formats::a8(tile, out),
        PixelFormat::La44 => formats::la44(tile, out),
        PixelFormat::L4 => formats::l4(tile, out),
        PixelFormat::A4 => formats::a4(tile, out),
        PixelFormat::Etc1 => formats::etc1(tile, quality, out),
        PixelFormat::Etc1A4 => formats::etc1a4(tile, quality, out),
    }
}

/// Rewrite one tile with the quantized colors the format would store.
pub fn preview_tile(tile: &mut Tile, format: PixelFormat, quality: etc1::Quality) {
    formats::preview(tile, format, quality);
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const ALL_FORMATS: [PixelFormat; 14] = [
        PixelFormat::Rgba8888,
        PixelFormat::Rgb888,
        PixelFormat::Rgba5551,
        PixelFormat::Rgb565,
        PixelFormat::Rgba4444,
        PixelFormat::La88,
        PixelFormat::Hilo88,
        PixelFormat::L8,
        PixelFormat::A8,
        PixelFormat::La44,
        PixelFormat::L4,
        PixelFormat::A4,
        PixelFormat::Etc1,
        PixelFormat::Etc1A4,
    ];

    fn test_tile() -> Tile {
        let mut pixels = [[0u8; 4]; 64];
        for (i, p) in pixels.iter_mut().enumerate() {
            *p = [(i * 4) as u8, (255 - i) as u8, (i * 7 % 256) as u8, (i * 3) as u8];
        }
        Tile { pixels }
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(PixelFormat::Rgba8888.tag(), 0x00);
        assert_eq!(PixelFormat::Rgb565.tag(), 0x03);
        assert_eq!(PixelFormat::A4.tag(), 0x0B);
        assert_eq!(PixelFormat::Etc1A4.tag(), 0x0D);
    }

    #[test]
    fn test_bytes_per_tile() {
        assert_eq!(PixelFormat::Rgba8888.bytes_per_tile(), 256);
        assert_eq!(PixelFormat::Rgb888.bytes_per_tile(), 192);
        assert_eq!(PixelFormat::Rgb565.bytes_per_tile(), 128);
        assert_eq!(PixelFormat::L8.bytes_per_tile(), 64);
        assert_eq!(PixelFormat::L4.bytes_per_tile(), 32);
        assert_eq!(PixelFormat::Etc1.bytes_per_tile(), 64);
        assert_eq!(PixelFormat::Etc1A4.bytes_per_tile(), 128);
    }

    #[test]
    fn test_every_format_appends_exact_byte_count() {
        let tile = test_tile();
        for format in ALL_FORMATS {
            let mut out = Vec::new();
            encode_tile(&tile, format, etc1::Quality::Low, &mut out);
            assert_eq!(
                out.len(),
                format.bytes_per_tile(),
                "format {} byte count",
                format
            );
        }
    }

    #[test]
    fn test_tile_image_roundtrip() {
        let img = RgbaImage::from_fn(16, 8, |x, y| Rgba([x as u8, y as u8, 7, 9]));
        let tile = Tile::from_image(&img, 8, 0);
        assert_eq!(tile.pixels[0], [8, 0, 7, 9]);
        assert_eq!(tile.pixels[63], [15, 7, 7, 9]);

        let mut out = RgbaImage::new(16, 8);
        tile.write_to_image(&mut out, 8, 0);
        for y in 0..8 {
            for x in 8..16 {
                assert_eq!(out.get_pixel(x, y), img.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_auto_l8_resolution() {
        let opaque = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 0]));
        assert_eq!(
            FormatRequest::AutoL8.resolve(&[opaque.clone()]),
            PixelFormat::L8
        );

        let translucent = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 200]));
        assert_eq!(
            FormatRequest::AutoL8.resolve(&[opaque, translucent]),
            PixelFormat::La88
        );
    }

    #[test]
    fn test_auto_l4_ignores_sub_threshold_alpha() {
        // Alpha that quantizes to zero at 4 bits does not trigger the
        // upgrade: to_bits(15, 4) == 0.
        let faint = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 15]));
        assert_eq!(FormatRequest::AutoL4.resolve(&[faint]), PixelFormat::L4);

        let visible = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 16]));
        assert_eq!(FormatRequest::AutoL4.resolve(&[visible]), PixelFormat::La44);
    }

    #[test]
    fn test_auto_etc1_resolution() {
        let opaque = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 0]));
        assert_eq!(FormatRequest::AutoEtc1.resolve(&[opaque]), PixelFormat::Etc1);

        let with_alpha = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 128]));
        assert_eq!(
            FormatRequest::AutoEtc1.resolve(&[with_alpha]),
            PixelFormat::Etc1A4
        );
    }

    #[test]
    fn test_exact_request_passthrough() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 255]));
        assert_eq!(
            FormatRequest::Exact(PixelFormat::Rgb565).resolve(&[img]),
            PixelFormat::Rgb565
        );
    }
}
