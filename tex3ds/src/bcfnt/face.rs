//! Scalable-font rasterization.
//!
//! Wraps `fontdue` behind the narrow interface the assembler needs:
//! enumerate the face's code points, read line metrics, render one glyph.
//! Point sizes convert to pixels at 96 dpi. The font object is immutable
//! and shared, so render jobs run on any worker thread.

use super::glyph::{CharWidthInfo, Glyph};
use super::BcfntError;
use image::GrayImage;
use std::sync::Arc;

/// Face-level vertical metrics, in pixels.
#[derive(Debug, Clone, Copy)]
pub struct FaceMetrics {
    /// Baseline-to-baseline distance.
    pub line_feed: u8,
    /// Distance from the baseline to the typographic top.
    pub ascent: i32,
    /// Distance from the baseline to the typographic bottom (negative).
    pub descent: i32,
}

/// A scalable font loaded at one point size.
#[derive(Clone)]
pub struct FontFace {
    font: Arc<fontdue::Font>,
    px: f32,
}

impl FontFace {
    /// Load a font from raw file data at `pt_size` points.
    pub fn from_bytes(data: &[u8], pt_size: f64) -> Result<Self, BcfntError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(|e| BcfntError::Font(e.to_string()))?;

        Ok(Self {
            font: Arc::new(font),
            px: (pt_size * 96.0 / 72.0) as f32,
        })
    }

    /// Code points the face maps, sorted, restricted to the BMP below the
    /// reserved 0xFFFF.
    pub fn codepoints(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self
            .font
            .chars()
            .keys()
            .filter_map(|&c| {
                let v = c as u32;
                if v < 0xFFFF {
                    Some(v as u16)
                } else {
                    None
                }
            })
            .collect();
        codes.sort_unstable();
        codes.dedup();
        codes
    }

    pub fn metrics(&self) -> FaceMetrics {
        match self.font.horizontal_line_metrics(self.px) {
            Some(lm) => FaceMetrics {
                line_feed: lm.new_line_size.round().clamp(0.0, 255.0) as u8,
                ascent: lm.ascent.round() as i32,
                descent: lm.descent.round() as i32,
            },
            None => FaceMetrics {
                line_feed: self.px.round() as u8,
                ascent: self.px.round() as i32,
                descent: 0,
            },
        }
    }

    /// Rasterize the glyph for `code`.
    pub fn render(&self, code: u16) -> Glyph {
        let ch = char::from_u32(code as u32).unwrap_or('\u{FFFD}');
        let (metrics, coverage) = self.font.rasterize(ch, self.px);

        let info = CharWidthInfo {
            left: metrics.xmin.clamp(i8::MIN as i32, i8::MAX as i32) as i8,
            glyph_width: metrics.width.min(255) as u8,
            char_width: metrics.advance_width.round().clamp(0.0, 255.0) as u8,
        };

        // The bitmap top relative to the baseline: fontdue's ymin is the
        // offset of the bottom-most row.
        let ascent = metrics.height as i32 + metrics.ymin;

        if metrics.width == 0 || metrics.height == 0 {
            return Glyph::blank(info, ascent);
        }

        let image = GrayImage::from_raw(metrics.width as u32, metrics.height as u32, coverage)
            .expect("fontdue coverage buffer matches its metrics");

        Glyph {
            image,
            info,
            ascent,
        }
    }
}
