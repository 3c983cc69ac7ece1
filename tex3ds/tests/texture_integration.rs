//! End-to-end texture pipeline tests: images in, container bytes out.

use image::{Rgba, RgbaImage};
use tex3ds::atlas::AtlasInput;
use tex3ds::compress::{decompress, CompressionFormat};
use tex3ds::encode::{FormatRequest, PixelFormat};
use tex3ds::quant;
use tex3ds::texture::{MipmapFilter, ProcessingMode, Tex3dsEncoder, TextureConfig};

fn single(image: RgbaImage) -> Vec<AtlasInput> {
    vec![AtlasInput {
        name: "input.png".into(),
        image,
    }]
}

#[test]
fn container_layout_for_single_tile() {
    // 8x8 constant image, RGBA8888, uncompressed: the whole file is
    // predictable byte for byte.
    let image = RgbaImage::from_pixel(8, 8, Rgba([0xAA, 0xBB, 0xCC, 0xDD]));
    let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgba8888))
        .with_compression(CompressionFormat::None);

    let texture = Tex3dsEncoder::new(config).encode(single(image)).unwrap();
    let bytes = texture.to_bytes(false);

    // Header: count, params, format, mipmaps + one 12-byte record.
    assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 1);
    assert_eq!(bytes[2], 0, "8x8 packs log2 fields of zero");
    assert_eq!(bytes[3], 0x00, "RGBA8888 tag");
    assert_eq!(bytes[4], 0);

    let record = &bytes[5..17];
    assert_eq!(u16::from_le_bytes([record[0], record[1]]), 8);
    assert_eq!(u16::from_le_bytes([record[2], record[3]]), 8);

    // Payload: compression header then 256 fixed bytes.
    let payload = &bytes[17..];
    assert_eq!(&payload[0..4], &[0x00, 0x00, 0x01, 0x00], "none, size 256");
    for chunk in payload[4..260].chunks_exact(4) {
        assert_eq!(chunk, &[0xDD, 0xCC, 0xBB, 0xAA]);
    }
}

#[test]
fn component_recovery_within_quantization_floor() {
    // Encode RGBA4444 and decode the stream by hand; every component
    // must come back within 255 / 15.
    let image = RgbaImage::from_fn(8, 8, |x, y| {
        Rgba([
            (x * 36) as u8,
            (y * 36) as u8,
            (x * y * 4) as u8,
            255 - (x * 8) as u8,
        ])
    });
    let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgba4444))
        .with_compression(CompressionFormat::None);

    let texture = Tex3dsEncoder::new(config)
        .encode(single(image.clone()))
        .unwrap();
    let body = decompress(&texture.payload).unwrap();
    assert_eq!(body.len(), 128);

    // Undo the swizzle by walking Morton positions.
    let morton = |x: u32, y: u32| -> usize {
        let mut out = 0;
        for bit in 0..3 {
            out |= ((x >> bit) & 1) << (2 * bit);
            out |= ((y >> bit) & 1) << (2 * bit + 1);
        }
        out as usize
    };

    let floor = 255 / 15 + 1;
    for y in 0..8 {
        for x in 0..8 {
            let slot = morton(x, y);
            let v = u16::from_le_bytes([body[slot * 2], body[slot * 2 + 1]]);

            let decoded = [
                quant::from_bits((v >> 12) as u8 & 0xF, 4),
                quant::from_bits((v >> 8) as u8 & 0xF, 4),
                quant::from_bits((v >> 4) as u8 & 0xF, 4),
                quant::from_bits(v as u8 & 0xF, 4),
            ];
            let original = image.get_pixel(x, y).0;

            for c in 0..4 {
                let diff = (decoded[c] as i32 - original[c] as i32).abs();
                assert!(
                    diff <= floor,
                    "pixel ({}, {}) channel {}: {} vs {}",
                    x,
                    y,
                    c,
                    decoded[c],
                    original[c]
                );
            }
        }
    }
}

#[test]
fn atlas_pipeline_end_to_end() {
    let inputs = vec![
        AtlasInput {
            name: "red.png".into(),
            image: RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 255])),
        },
        AtlasInput {
            name: "green.png".into(),
            image: RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255])),
        },
    ];

    let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgba8888))
        .with_compression(CompressionFormat::Lz11)
        .with_mode(ProcessingMode::Atlas);

    let texture = Tex3dsEncoder::new(config).encode(inputs).unwrap();

    assert_eq!((texture.width, texture.height), (32, 16));

    let red = &texture.subimages[0];
    assert_eq!(
        (red.left, red.top, red.right, red.bottom),
        (0.0, 1.0, 0.5, 0.0)
    );
    let green = &texture.subimages[1];
    assert_eq!(
        (green.left, green.top, green.right, green.bottom),
        (0.5, 1.0, 0.75, 0.5)
    );

    // The compressed body decodes to the full 32x16 RGBA stream.
    let body = decompress(&texture.payload).unwrap();
    assert_eq!(body.len(), 32 * 16 * 4);
}

#[test]
fn every_format_produces_expected_body_size() {
    let formats = [
        (PixelFormat::Rgba8888, 4096),
        (PixelFormat::Rgb888, 3072),
        (PixelFormat::Rgba5551, 2048),
        (PixelFormat::Rgb565, 2048),
        (PixelFormat::Rgba4444, 2048),
        (PixelFormat::La88, 2048),
        (PixelFormat::Hilo88, 2048),
        (PixelFormat::L8, 1024),
        (PixelFormat::A8, 1024),
        (PixelFormat::La44, 1024),
        (PixelFormat::L4, 512),
        (PixelFormat::A4, 512),
        (PixelFormat::Etc1, 512),
        (PixelFormat::Etc1A4, 1024),
    ];

    let image = RgbaImage::from_fn(32, 32, |x, y| {
        Rgba([(x * 8) as u8, (y * 8) as u8, 128, (x * y) as u8])
    });

    for (format, expected) in formats {
        let config = TextureConfig::new(FormatRequest::Exact(format))
            .with_compression(CompressionFormat::None);
        let texture = Tex3dsEncoder::new(config)
            .encode(single(image.clone()))
            .unwrap();
        let body = decompress(&texture.payload).unwrap();
        assert_eq!(body.len(), expected, "format {}", format);
    }
}

#[test]
fn mipmapped_compressed_texture_roundtrips() {
    let image = RgbaImage::from_fn(64, 64, |x, y| {
        Rgba([(x * 4) as u8, (y * 4) as u8, 0, 255])
    });

    let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgb565))
        .with_compression(CompressionFormat::Auto)
        .with_mipmap_filter(MipmapFilter::Triangle);

    let texture = Tex3dsEncoder::new(config).encode(single(image)).unwrap();

    assert_eq!(texture.mipmap_levels, 3, "64 -> 32 -> 16 -> 8");

    let body = decompress(&texture.payload).unwrap();
    let expected: usize = [64usize, 32, 16, 8].iter().map(|s| s * s * 2).sum();
    assert_eq!(body.len(), expected);
}

#[test]
fn file_written_to_disk_matches_to_bytes() {
    let image = RgbaImage::from_pixel(16, 8, Rgba([3, 5, 7, 9]));
    let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgba8888));
    let texture = Tex3dsEncoder::new(config).encode(single(image)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.t3x");

    let mut file = std::fs::File::create(&path).unwrap();
    texture.write_to(&mut file, false).unwrap();
    drop(file);

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk, texture.to_bytes(false));
}
