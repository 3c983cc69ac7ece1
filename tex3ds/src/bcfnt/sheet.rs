//! Glyph sheet layout and the 4-bit alpha tile path.
//!
//! Glyphs sit on fixed 1024×1024 alpha sheets in a grid of
//! `glyphs_per_row × glyphs_per_col` cells. Stored sheets are Morton
//! swizzled and packed two pixels per byte (second pixel of each pair in
//! the high nibble).

use super::glyph::Glyph;
use crate::quant::{from_bits, to_bits};
use crate::swizzle::swizzle;
use image::GrayImage;

pub(crate) const SHEET_WIDTH: u32 = 1024;
pub(crate) const SHEET_HEIGHT: u32 = 1024;

/// Bytes per stored sheet (4 bits per pixel).
pub(crate) const SHEET_SIZE: usize = (SHEET_WIDTH * SHEET_HEIGHT / 2) as usize;

/// Cell grid parameters shared by sheet building and read-back.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SheetGeometry {
    pub glyph_width: u32,
    pub glyph_height: u32,
    pub glyphs_per_row: u32,
    pub glyphs_per_col: u32,
    pub ascent: i32,
}

impl SheetGeometry {
    pub fn glyphs_per_sheet(&self) -> usize {
        (self.glyphs_per_row * self.glyphs_per_col) as usize
    }
}

/// Compose one sheet from up to `glyphs_per_sheet` glyphs in code order.
pub(crate) fn build_sheet(glyphs: &[&Glyph], geometry: &SheetGeometry) -> GrayImage {
    let mut sheet = GrayImage::new(SHEET_WIDTH, SHEET_HEIGHT);

    for (slot, glyph) in glyphs.iter().enumerate() {
        if glyph.image.width() == 0 || glyph.image.height() == 0 {
            continue;
        }

        let row = slot as u32 / geometry.glyphs_per_row;
        let col = slot as u32 % geometry.glyphs_per_row;

        let x0 = col * geometry.glyph_width + 1;
        let y0 = row * geometry.glyph_height + 1 + (geometry.ascent - glyph.ascent).max(0) as u32;

        for (gx, gy, p) in glyph.image.enumerate_pixels() {
            let x = x0 + gx;
            let y = y0 + gy;
            if x < SHEET_WIDTH && y < SHEET_HEIGHT {
                sheet.put_pixel(x, y, *p);
            }
        }
    }

    sheet
}

/// Swizzle a sheet and pack it to 4-bit alpha.
pub(crate) fn pack_sheet(mut sheet: GrayImage) -> Vec<u8> {
    swizzle(&mut sheet, false);

    let mut out = Vec::with_capacity(SHEET_SIZE);
    for ty in (0..SHEET_HEIGHT).step_by(8) {
        for tx in (0..SHEET_WIDTH).step_by(8) {
            for i in (0..64).step_by(2) {
                let first = sheet.get_pixel(tx + i % 8, ty + i / 8)[0];
                let second = sheet.get_pixel(tx + (i + 1) % 8, ty + (i + 1) / 8)[0];
                out.push((to_bits(second, 4) << 4) | to_bits(first, 4));
            }
        }
    }

    debug_assert_eq!(out.len(), SHEET_SIZE);
    out
}

/// Reverse of [`pack_sheet`]: expand 4-bit alpha and unswizzle. Parsed
/// fonts may carry sheet dimensions other than the 1024×1024 we emit.
pub(crate) fn unpack_sheet(data: &[u8], width: u32, height: u32) -> GrayImage {
    debug_assert_eq!(data.len(), (width * height / 2) as usize);

    let mut sheet = GrayImage::new(width, height);
    let mut input = data.iter();

    for ty in (0..height).step_by(8) {
        for tx in (0..width).step_by(8) {
            for i in (0..64).step_by(2) {
                let byte = *input.next().expect("sheet size checked");
                sheet.put_pixel(
                    tx + i % 8,
                    ty + i / 8,
                    image::Luma([from_bits(byte & 0xF, 4)]),
                );
                sheet.put_pixel(
                    tx + (i + 1) % 8,
                    ty + (i + 1) / 8,
                    image::Luma([from_bits(byte >> 4, 4)]),
                );
            }
        }
    }

    swizzle(&mut sheet, true);
    sheet
}
