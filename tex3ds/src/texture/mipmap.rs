//! Mipmap chain generation.

use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Downsampling filter, passed through to the image library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipmapFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl MipmapFilter {
    fn to_image_filter(self) -> FilterType {
        match self {
            MipmapFilter::Nearest => FilterType::Nearest,
            MipmapFilter::Triangle => FilterType::Triangle,
            MipmapFilter::CatmullRom => FilterType::CatmullRom,
            MipmapFilter::Gaussian => FilterType::Gaussian,
            MipmapFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Mipmap generator.
pub struct MipmapGenerator;

impl MipmapGenerator {
    /// Generate the level chain for `source`, largest first.
    ///
    /// Each level halves both dimensions, resampled from the base image
    /// with the chosen filter. Levels stop once either dimension would
    /// shrink below the 8-pixel tile size.
    pub fn generate_chain(source: &RgbaImage, filter: MipmapFilter) -> Vec<RgbaImage> {
        let mut chain = vec![source.clone()];

        let (mut width, mut height) = source.dimensions();
        while width > 8 && height > 8 {
            width /= 2;
            height /= 2;
            chain.push(imageops::resize(
                source,
                width,
                height,
                filter.to_image_filter(),
            ));
        }

        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_chain_dimensions() {
        let source = RgbaImage::new(64, 64);
        let chain = MipmapGenerator::generate_chain(&source, MipmapFilter::Triangle);

        // 64 -> 32 -> 16 -> 8
        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].dimensions(), (64, 64));
        assert_eq!(chain[1].dimensions(), (32, 32));
        assert_eq!(chain[2].dimensions(), (16, 16));
        assert_eq!(chain[3].dimensions(), (8, 8));
    }

    #[test]
    fn test_chain_stops_at_short_side() {
        let source = RgbaImage::new(64, 16);
        let chain = MipmapGenerator::generate_chain(&source, MipmapFilter::Nearest);

        // 64x16 -> 32x8; the short side stops the chain.
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].dimensions(), (32, 8));
    }

    #[test]
    fn test_single_tile_has_no_mipmaps() {
        let source = RgbaImage::new(8, 8);
        let chain = MipmapGenerator::generate_chain(&source, MipmapFilter::Lanczos3);
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_solid_color_preserved() {
        let source = RgbaImage::from_pixel(32, 32, Rgba([200, 100, 50, 255]));
        let chain = MipmapGenerator::generate_chain(&source, MipmapFilter::Triangle);

        for level in &chain {
            for p in level.pixels() {
                assert_eq!(p.0, [200, 100, 50, 255]);
            }
        }
    }
}
