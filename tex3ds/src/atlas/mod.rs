//! Texture atlas construction.
//!
//! Packs a set of input images into one power-of-two canvas no larger than
//! 1024×1024, recording for each input a [`SubImage`] with normalized UV
//! coordinates. Inputs may be rotated 90° counter-clockwise when that
//! packs tighter; rotation is signalled to consumers by emitting the UV
//! tuple with `top < bottom`.

mod packer;

use image::imageops;
use image::RgbaImage;
use thiserror::Error;
use tracing::debug;

/// One atlas input: the source image plus the name consumers will use to
/// look its region up (the basename of the source file).
pub struct AtlasInput {
    pub name: String,
    pub image: RgbaImage,
}

/// A named rectangle within a composed atlas.
///
/// Coordinates are normalized texture coordinates with `top` near 1 and
/// `bottom` near 0. A sub-image stored rotated swaps its vertical
/// ordering: `top < bottom` iff the region is rotated 90°
/// counter-clockwise in the atlas.
#[derive(Debug, Clone, PartialEq)]
pub struct SubImage {
    /// Insertion order of the source image; output tables keep this order.
    pub index: usize,
    /// Basename of the source file; empty for a synthesized whole-image
    /// record.
    pub name: String,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl SubImage {
    /// Whether the region occupies the atlas rotated 90°
    /// counter-clockwise.
    pub fn rotated(&self) -> bool {
        self.top < self.bottom
    }
}

/// Errors from atlas construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AtlasError {
    /// No power-of-two canvas up to 1024×1024 accepts all inputs.
    #[error("no atlas solution found within 1024x1024")]
    Unsolvable,
}

/// A composed atlas image with its sub-image table.
pub struct Atlas {
    pub image: RgbaImage,
    pub subimages: Vec<SubImage>,
}

/// Power-of-two ceiling, floor of 8.
pub(crate) fn pot_ceil(x: u32) -> u32 {
    x.max(8).next_power_of_two()
}

/// Crop an image to the bounding box of its non-transparent pixels.
/// Fully transparent images are returned unchanged.
pub(crate) fn trim_image(img: &RgbaImage) -> RgbaImage {
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;

    for (x, y, p) in img.enumerate_pixels() {
        if p.0[3] != 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if min_x > max_x {
        return img.clone();
    }

    imageops::crop_imm(img, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image()
}

struct Source {
    index: usize,
    name: String,
    image: RgbaImage,
}

impl Atlas {
    /// Pack `inputs` into an atlas.
    ///
    /// When `trim` is set each input is first cropped to its
    /// non-transparent bounding box. `border` pixels of transparent
    /// spacing are kept around every placed image.
    pub fn build(inputs: Vec<AtlasInput>, trim: bool, border: u32) -> Result<Self, AtlasError> {
        if inputs.is_empty() {
            return Err(AtlasError::Unsolvable);
        }

        let mut sources: Vec<Source> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| Source {
                index,
                name: input.name,
                image: if trim {
                    trim_image(&input.image)
                } else {
                    input.image
                },
            })
            .collect();

        // Ascending by area so the packer pops the largest first.
        sources.sort_by_key(|s| {
            let (w, h) = s.image.dimensions();
            (w as u64 * h as u64, w.max(h), w)
        });

        let total_area: u64 = sources
            .iter()
            .map(|s| {
                let (w, h) = s.image.dimensions();
                (w + border) as u64 * (h + border) as u64
            })
            .sum();

        let largest = sources.last().expect("inputs are non-empty");
        let base = pot_ceil(largest.image.width().min(largest.image.height()));

        // Candidate canvases, smallest usable area first; ties prefer the
        // wider canvas.
        let mut candidates = Vec::new();
        let mut h = base;
        while h <= 1024 {
            let mut w = base;
            while w <= 1024 {
                let usable = w.saturating_sub(border) as u64 * h.saturating_sub(border) as u64;
                if usable >= total_area {
                    candidates.push((w, h));
                }
                w *= 2;
            }
            h *= 2;
        }
        candidates.sort_by_key(|&(w, h)| (w as u64 * h as u64, w.max(h), h));

        for (w, h) in candidates {
            let blocks: Vec<packer::Block> = sources
                .iter()
                .enumerate()
                .map(|(i, s)| packer::Block {
                    source: i,
                    w: s.image.width() + border,
                    h: s.image.height() + border,
                })
                .collect();

            if let Some(placed) =
                packer::Packer::new(blocks, w.saturating_sub(border), h.saturating_sub(border))
                    .solve()
            {
                debug!(width = w, height = h, "atlas solved");
                return Ok(Self::compose(&sources, &placed, w, h, border));
            }
        }

        Err(AtlasError::Unsolvable)
    }

    fn compose(
        sources: &[Source],
        placed: &[packer::Placed],
        width: u32,
        height: u32,
        border: u32,
    ) -> Self {
        let mut image = RgbaImage::new(width, height);
        let mut subimages = Vec::with_capacity(placed.len());

        for p in placed {
            let source = &sources[p.source];

            let dx = (p.x + border) as i64;
            let dy = (p.y + border) as i64;
            if p.rotated {
                imageops::replace(&mut image, &imageops::rotate270(&source.image), dx, dy);
            } else {
                imageops::replace(&mut image, &source.image, dx, dy);
            }

            let left = (p.x + border) as f32 / width as f32;
            let top = 1.0 - (p.y + border) as f32 / height as f32;
            let right = (p.x + p.w) as f32 / width as f32;
            let bottom = 1.0 - (p.y + p.h) as f32 / height as f32;

            subimages.push(if p.rotated {
                // The inverted vertical ordering marks the rotation.
                SubImage {
                    index: source.index,
                    name: source.name.clone(),
                    left: bottom,
                    top: left,
                    right: top,
                    bottom: right,
                }
            } else {
                SubImage {
                    index: source.index,
                    name: source.name.clone(),
                    left,
                    top,
                    right,
                    bottom,
                }
            });
        }

        subimages.sort_by_key(|s| s.index);

        Self { image, subimages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(rgba))
    }

    fn input(name: &str, image: RgbaImage) -> AtlasInput {
        AtlasInput {
            name: name.to_string(),
            image,
        }
    }

    #[test]
    fn test_pot_ceil() {
        assert_eq!(pot_ceil(1), 8);
        assert_eq!(pot_ceil(8), 8);
        assert_eq!(pot_ceil(9), 16);
        assert_eq!(pot_ceil(600), 1024);
    }

    #[test]
    fn test_two_squares() {
        // A 16×16 and an 8×8 input pack onto a 32×16 canvas: the square
        // at the origin, the small one beside it.
        let atlas = Atlas::build(
            vec![
                input("red", solid(16, 16, [255, 0, 0, 255])),
                input("green", solid(8, 8, [0, 255, 0, 255])),
            ],
            false,
            0,
        )
        .unwrap();

        assert_eq!(atlas.image.dimensions(), (32, 16));
        assert_eq!(atlas.image.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(atlas.image.get_pixel(16, 0).0, [0, 255, 0, 255]);
        assert_eq!(atlas.image.get_pixel(24, 0).0, [0, 0, 0, 0]);

        let red = &atlas.subimages[0];
        assert_eq!(red.index, 0);
        assert_eq!(red.name, "red");
        assert_eq!(
            (red.left, red.top, red.right, red.bottom),
            (0.0, 1.0, 0.5, 0.0)
        );

        let green = &atlas.subimages[1];
        assert_eq!(green.index, 1);
        assert_eq!(
            (green.left, green.top, green.right, green.bottom),
            (0.5, 1.0, 0.75, 0.5)
        );
        assert!(!green.rotated());
    }

    #[test]
    fn test_subimages_sorted_by_insertion_index() {
        // The packer places the largest first, but the output table is in
        // input order.
        let atlas = Atlas::build(
            vec![
                input("small", solid(8, 8, [1, 1, 1, 255])),
                input("big", solid(32, 32, [2, 2, 2, 255])),
            ],
            false,
            0,
        )
        .unwrap();

        assert_eq!(atlas.subimages[0].name, "small");
        assert_eq!(atlas.subimages[1].name, "big");
    }

    #[test]
    fn test_rotation_signalled_by_inverted_uvs() {
        // A 16×8 and an 8×16 bar only fill a 16×16 canvas if the second
        // one rotates into the bottom half.
        let mut wide = solid(16, 8, [10, 10, 10, 255]);
        wide.put_pixel(15, 0, Rgba([200, 0, 0, 255]));

        let mut tall = solid(8, 16, [0, 0, 200, 255]);
        tall.put_pixel(0, 0, Rgba([0, 200, 0, 255]));

        let atlas = Atlas::build(vec![input("wide", wide), input("tall", tall)], false, 0).unwrap();

        assert_eq!(atlas.image.dimensions(), (16, 16));

        assert!(!atlas.subimages[0].rotated());
        let tall_sub = &atlas.subimages[1];
        assert!(tall_sub.rotated(), "tall bar should pack rotated");

        // The wide bar keeps its orientation at the origin.
        assert_eq!(atlas.image.get_pixel(15, 0).0, [200, 0, 0, 255]);

        // 90° counter-clockwise: tall source (0, 0) lands at the rotated
        // block's bottom-left corner, (0, 8 + 7).
        assert_eq!(atlas.image.get_pixel(0, 15).0, [0, 200, 0, 255]);
        assert_eq!(atlas.image.get_pixel(15, 15).0, [0, 0, 200, 255]);

        // Inverted vertical ordering carries the rotation flag.
        assert_eq!(
            (tall_sub.left, tall_sub.top, tall_sub.right, tall_sub.bottom),
            (0.0, 0.0, 0.5, 1.0)
        );
    }

    #[test]
    fn test_subimages_do_not_overlap() {
        let atlas = Atlas::build(
            vec![
                input("a", solid(16, 16, [1, 0, 0, 255])),
                input("b", solid(16, 8, [2, 0, 0, 255])),
                input("c", solid(8, 8, [3, 0, 0, 255])),
                input("d", solid(8, 8, [4, 0, 0, 255])),
            ],
            false,
            0,
        )
        .unwrap();

        // Count placed pixels per source color; overlap would lose some.
        let mut counts = [0usize; 5];
        for p in atlas.image.pixels() {
            if p.0[3] != 0 {
                counts[p.0[0] as usize] += 1;
            }
        }
        assert_eq!(counts[1], 256);
        assert_eq!(counts[2], 128);
        assert_eq!(counts[3], 64);
        assert_eq!(counts[4], 64);
    }

    #[test]
    fn test_border_keeps_inputs_apart() {
        let atlas = Atlas::build(
            vec![
                input("a", solid(8, 8, [1, 0, 0, 255])),
                input("b", solid(8, 8, [2, 0, 0, 255])),
            ],
            false,
            2,
        )
        .unwrap();

        // Every placed pixel sits at least 2px from any pixel of the
        // other input.
        let mut a_pixels = Vec::new();
        let mut b_pixels = Vec::new();
        for (x, y, p) in atlas.image.enumerate_pixels() {
            match p.0[0] {
                1 => a_pixels.push((x as i64, y as i64)),
                2 => b_pixels.push((x as i64, y as i64)),
                _ => {}
            }
        }
        assert_eq!(a_pixels.len(), 64);
        assert_eq!(b_pixels.len(), 64);

        for &(ax, ay) in &a_pixels {
            for &(bx, by) in &b_pixels {
                let gap = (ax - bx).abs().max((ay - by).abs());
                assert!(gap > 2, "inputs touch at ({}, {}) / ({}, {})", ax, ay, bx, by);
            }
        }
    }

    #[test]
    fn test_trim_crops_transparent_margins() {
        let mut img = solid(16, 16, [0, 0, 0, 0]);
        for y in 4..8 {
            for x in 2..10 {
                img.put_pixel(x, y, Rgba([9, 9, 9, 255]));
            }
        }

        let trimmed = trim_image(&img);
        assert_eq!(trimmed.dimensions(), (8, 4));
        assert_eq!(trimmed.get_pixel(0, 0).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_trim_fully_transparent_is_unchanged() {
        let img = solid(4, 4, [0, 0, 0, 0]);
        assert_eq!(trim_image(&img).dimensions(), (4, 4));
    }

    #[test]
    fn test_unsolvable_when_inputs_exceed_canvas() {
        let result = Atlas::build(
            vec![
                input("a", solid(1024, 1024, [1, 1, 1, 255])),
                input("b", solid(1024, 1024, [2, 2, 2, 255])),
            ],
            false,
            0,
        );
        assert_eq!(result.err(), Some(AtlasError::Unsolvable));
    }

    #[test]
    fn test_empty_input_list_is_unsolvable() {
        assert_eq!(
            Atlas::build(Vec::new(), false, 0).err(),
            Some(AtlasError::Unsolvable)
        );
    }

    #[test]
    fn test_uniform_inputs_pack_trivially() {
        let inputs: Vec<AtlasInput> = (0..16)
            .map(|i| input(&format!("tile{}", i), solid(8, 8, [i as u8, 0, 0, 255])))
            .collect();

        let atlas = Atlas::build(inputs, false, 0).unwrap();
        assert_eq!(atlas.image.dimensions(), (32, 32));
        assert_eq!(atlas.subimages.len(), 16);
    }
}
