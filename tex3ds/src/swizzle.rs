//! Morton-order tile swizzling.
//!
//! The PICA 200 expects texel data in 8×8 tiles whose 64 texels are stored
//! in Morton (Z-order) sequence. The permutation of one tile decomposes into
//! twelve 4-cycles plus four 2-swaps; the table below is the fixed-point-free
//! part of the mapping `linear index -> Morton index` for an 8×8 grid.
//!
//! Swizzling is an involution pair: applying the forward permutation and
//! then the reverse permutation leaves every pixel in place.

use image::{ImageBuffer, Pixel};

/// 4-cycles of the 8×8 Morton permutation.
///
/// Each entry `{a, b, c, d}` rotates `p[a] <- p[b] <- p[c] <- p[d] <- p[a]`
/// in the forward direction. Derivable from the Morton encoding of the
/// intra-tile coordinates 0..63.
const QUARTETS: [[usize; 4]; 12] = [
    [2, 8, 16, 4],
    [3, 9, 17, 5],
    [6, 10, 24, 20],
    [7, 11, 25, 21],
    [14, 26, 28, 22],
    [15, 27, 29, 23],
    [34, 40, 48, 36],
    [35, 41, 49, 37],
    [38, 42, 56, 52],
    [39, 43, 57, 53],
    [46, 58, 60, 54],
    [47, 59, 61, 55],
];

/// 2-swaps of the 8×8 Morton permutation. Direction-independent.
const PAIRS: [(usize, usize); 4] = [(12, 18), (13, 19), (44, 50), (45, 51)];

/// Swizzle or unswizzle one 8×8 tile held as a flat 64-element array.
fn swizzle_tile<P: Copy>(p: &mut [P; 64], reverse: bool) {
    if !reverse {
        for &[a, b, c, d] in &QUARTETS {
            let tmp = p[a];
            p[a] = p[b];
            p[b] = p[c];
            p[c] = p[d];
            p[d] = tmp;
        }
    } else {
        for &[a, b, c, d] in &QUARTETS {
            let tmp = p[d];
            p[d] = p[c];
            p[c] = p[b];
            p[b] = p[a];
            p[a] = tmp;
        }
    }

    for &(a, b) in &PAIRS {
        p.swap(a, b);
    }
}

/// Swizzle an image in place (Morton order).
///
/// Both dimensions must be multiples of 8; the tiling layers above guarantee
/// this. `reverse` selects unswizzling.
pub fn swizzle<P>(img: &mut ImageBuffer<P, Vec<P::Subpixel>>, reverse: bool)
where
    P: Pixel + 'static,
{
    let width = img.width();
    let height = img.height();

    debug_assert!(width % 8 == 0 && height % 8 == 0);

    let mut tile = [*img.get_pixel(0, 0); 64];

    for ty in (0..height).step_by(8) {
        for tx in (0..width).step_by(8) {
            for (i, slot) in tile.iter_mut().enumerate() {
                *slot = *img.get_pixel(tx + (i % 8) as u32, ty + (i / 8) as u32);
            }

            swizzle_tile(&mut tile, reverse);

            for (i, slot) in tile.iter().enumerate() {
                img.put_pixel(tx + (i % 8) as u32, ty + (i / 8) as u32, *slot);
            }
        }
    }
}
