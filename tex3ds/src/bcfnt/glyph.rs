//! Glyph bitmaps and width records.

use image::GrayImage;

/// Per-character width information, stored 3 bytes per glyph in the CWDH
/// block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CharWidthInfo {
    /// Horizontal offset to draw the glyph with.
    pub left: i8,
    /// Width of the glyph bitmap.
    pub glyph_width: u8,
    /// Horizontal distance to advance after drawing.
    pub char_width: u8,
}

/// One rasterized glyph: an alpha-coverage bitmap plus its width record
/// and the ascent used to seat the bitmap on the sheet baseline.
#[derive(Debug, Clone)]
pub struct Glyph {
    /// Alpha coverage; may be zero-sized for blank glyphs.
    pub image: GrayImage,
    pub info: CharWidthInfo,
    /// Distance from the baseline to the bitmap top.
    pub ascent: i32,
}

impl Glyph {
    /// A glyph with no bitmap (e.g. a space).
    pub fn blank(info: CharWidthInfo, ascent: i32) -> Self {
        Self {
            image: GrayImage::new(0, 0),
            info,
            ascent,
        }
    }
}
