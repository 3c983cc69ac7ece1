//! BCFNT font container assembly.
//!
//! Builds 3DS fonts from prioritized glyph sources: scalable fonts
//! rasterized through [`FontFace`], or previously serialized BCFNT files
//! parsed back with [`Bcfnt::parse`]. Earlier sources win; a code point
//! already present is never overwritten. The container stores glyph
//! bitmaps on swizzled 4-bit alpha sheets with a width table (CWDH) and a
//! chain of code-mapping blocks (CMAP).

mod cmap;
mod face;
mod glyph;
mod sheet;

pub use cmap::{Cmap, CmapData, MAPPING_DIRECT, MAPPING_SCAN, MAPPING_TABLE};
pub use face::{FaceMetrics, FontFace};
pub use glyph::{CharWidthInfo, Glyph};

use crate::pool::WorkerPool;
use sheet::{SheetGeometry, SHEET_HEIGHT, SHEET_SIZE, SHEET_WIDTH};
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from font assembly and BCFNT parsing.
#[derive(Debug, Error)]
pub enum BcfntError {
    #[error("font error: {0}")]
    Font(String),

    #[error("not a BCFNT file")]
    BadMagic,

    #[error("big-endian BCFNT files are not supported")]
    BigEndian,

    #[error("unsupported sheet format 0x{0:02X} (only 4-bit alpha)")]
    UnsupportedSheetFormat(u16),

    #[error("unsupported mapping method {0}")]
    UnsupportedMappingMethod(u16),

    #[error("truncated BCFNT data")]
    Truncated,

    #[error("font has no glyphs")]
    EmptyFont,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Allow/deny filter over code points.
///
/// Holds a sorted code list; a blacklist admits everything not listed, a
/// whitelist only what is listed.
#[derive(Debug, Clone)]
pub struct CodeFilter {
    list: Vec<u16>,
    blacklist: bool,
}

impl CodeFilter {
    /// Admit every code point (an empty blacklist).
    pub fn allow_all() -> Self {
        Self {
            list: Vec::new(),
            blacklist: true,
        }
    }

    pub fn blacklist(mut codes: Vec<u16>) -> Self {
        codes.sort_unstable();
        Self {
            list: codes,
            blacklist: true,
        }
    }

    pub fn whitelist(mut codes: Vec<u16>) -> Self {
        codes.sort_unstable();
        Self {
            list: codes,
            blacklist: false,
        }
    }

    pub fn allows(&self, code: u16) -> bool {
        self.list.binary_search(&code).is_ok() != self.blacklist
    }
}

/// A BCFNT font under construction.
pub struct Bcfnt {
    cmaps: Vec<Cmap>,
    /// Glyphs keyed by code point; the sorted iteration order drives CMAP
    /// construction, sheet layout, and the CWDH table.
    glyphs: BTreeMap<u16, Glyph>,

    num_sheets: u16,
    alt_index: u16,
    default_width: CharWidthInfo,
    line_feed: u8,
    height: u8,
    width: u8,
    max_width: u8,
    ascent: u8,

    cell_width: u8,
    cell_height: u8,

    sheet_width: u16,
    sheet_height: u16,
    sheet_size: u32,

    glyph_width: u16,
    glyph_height: u16,
    glyphs_per_row: u16,
    glyphs_per_col: u16,
    glyphs_per_sheet: u16,
}

impl Default for Bcfnt {
    fn default() -> Self {
        Self::new()
    }
}

impl Bcfnt {
    pub fn new() -> Self {
        Self {
            cmaps: Vec::new(),
            glyphs: BTreeMap::new(),
            num_sheets: 0,
            alt_index: 0,
            default_width: CharWidthInfo::default(),
            line_feed: 0,
            height: 0,
            width: 0,
            max_width: 0,
            ascent: 0,
            cell_width: 0,
            cell_height: 0,
            sheet_width: SHEET_WIDTH as u16,
            sheet_height: SHEET_HEIGHT as u16,
            sheet_size: SHEET_SIZE as u32,
            glyph_width: 0,
            glyph_height: 0,
            glyphs_per_row: 0,
            glyphs_per_col: 0,
            glyphs_per_sheet: 0,
        }
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph(&self, code: u16) -> Option<&Glyph> {
        self.glyphs.get(&code)
    }

    pub fn alt_index(&self) -> u16 {
        self.alt_index
    }

    pub fn cmaps(&self) -> &[Cmap] {
        &self.cmaps
    }

    pub fn sheet_count(&self) -> u16 {
        self.num_sheets
    }

    /// Ingest every permitted glyph of a rasterized face. Code points
    /// already present keep their earlier (higher-priority) glyph.
    pub fn add_face(&mut self, font_face: &FontFace, filter: &CodeFilter) {
        let metrics = font_face.metrics();

        self.line_feed = self.line_feed.max(metrics.line_feed);
        self.ascent = self.ascent.max(metrics.ascent.clamp(0, 255) as u8);

        // Descent re-derives per source; glyphs below tighten it further.
        let state = std::sync::Arc::new(Mutex::new(IngestState {
            glyphs: Vec::new(),
            ascent: self.ascent as i32,
            descent: metrics.descent.min(0),
            max_width: self.max_width as u32,
            height: self.height as u32,
            width: self.width as u32,
        }));

        let pool = WorkerPool::new();
        for code in font_face.codepoints() {
            if self.glyphs.contains_key(&code) || !filter.allows(code) {
                continue;
            }

            let face = font_face.clone();
            let state = std::sync::Arc::clone(&state);
            pool.execute(move || {
                let glyph = face.render(code);

                let mut s = state.lock().expect("ingest state poisoned");
                s.ascent = s.ascent.max(glyph.ascent);
                s.descent = s.descent.min(glyph.ascent - glyph.image.height() as i32);
                s.max_width = s.max_width.max(glyph.image.width());
                s.height = s.height.max(glyph.image.height());
                s.width = s.width.max(glyph.image.width());
                s.glyphs.push((code, glyph));
            });
        }
        drop(pool);

        let state = std::sync::Arc::try_unwrap(state)
            .ok()
            .expect("render workers joined")
            .into_inner()
            .expect("ingest state poisoned");

        for (code, glyph) in state.glyphs {
            self.glyphs.entry(code).or_insert(glyph);
        }

        if self.glyphs.is_empty() {
            warn!("face contributed no glyphs");
            return;
        }

        self.ascent = state.ascent.clamp(0, 255) as u8;
        self.max_width = state.max_width.min(255) as u8;
        self.height = state.height.min(255) as u8;
        self.width = state.width.min(255) as u8;

        self.cell_width = self.max_width.saturating_add(1);
        self.cell_height = (state.ascent - state.descent).clamp(0, 255) as u8;
        self.refresh_geometry();

        self.alt_index = self.pick_alt_index();
        self.cmaps = cmap::refresh_cmaps(&self.glyphs);
        self.num_sheets = ((self.glyphs.len() - 1) / self.glyphs_per_sheet as usize + 1) as u16;
        cmap::coalesce_cmaps(&mut self.cmaps);

        debug!(
            glyphs = self.glyphs.len(),
            sheets = self.num_sheets,
            "face ingested"
        );
    }

    /// Insert pre-rasterized glyphs directly, as a bitmap glyph source.
    /// Code points already present keep their earlier glyph; 0xFFFF is
    /// reserved and ignored.
    pub fn add_glyphs<I>(&mut self, glyphs: I)
    where
        I: IntoIterator<Item = (u16, Glyph)>,
    {
        let mut ascent = self.ascent as i32;
        let mut descent = 0i32;
        let mut max_width = self.max_width as u32;
        let mut height = self.height as u32;
        let mut width = self.width as u32;

        for (code, glyph) in glyphs {
            if code == 0xFFFF {
                continue;
            }

            ascent = ascent.max(glyph.ascent);
            descent = descent.min(glyph.ascent - glyph.image.height() as i32);
            max_width = max_width.max(glyph.image.width());
            height = height.max(glyph.image.height());
            width = width.max(glyph.image.width());

            self.glyphs.entry(code).or_insert(glyph);
        }

        if self.glyphs.is_empty() {
            return;
        }

        self.ascent = ascent.clamp(0, 255) as u8;
        self.max_width = max_width.min(255) as u8;
        self.height = height.min(255) as u8;
        self.width = width.min(255) as u8;

        self.cell_width = self.max_width.saturating_add(1);
        self.cell_height = (ascent - descent).clamp(0, 255) as u8;
        self.refresh_geometry();

        self.alt_index = self.pick_alt_index();
        self.cmaps = cmap::refresh_cmaps(&self.glyphs);
        self.num_sheets = ((self.glyphs.len() - 1) / self.glyphs_per_sheet as usize + 1) as u16;
        cmap::coalesce_cmaps(&mut self.cmaps);
    }

    /// Merge another font in at lower priority: adopt every permitted
    /// code point not already present, then recompute the geometry from
    /// the element-wise maxima.
    pub fn merge(&mut self, other: &Bcfnt, filter: &CodeFilter) {
        let new_ascent = self.ascent.max(other.ascent);
        let new_cell_height = (new_ascent as i32
            + (other.cell_height as i32 - other.ascent as i32)
                .max(self.cell_height as i32 - self.ascent as i32))
        .clamp(0, 255) as u8;
        let new_cell_width = self.cell_width.max(other.cell_width);

        for (&code, glyph) in &other.glyphs {
            if code != 0xFFFF && !self.glyphs.contains_key(&code) && filter.allows(code) {
                self.glyphs.insert(code, glyph.clone());
            }
        }

        self.cmaps = cmap::refresh_cmaps(&self.glyphs);

        self.ascent = new_ascent;
        self.cell_height = new_cell_height;
        self.cell_width = new_cell_width;
        self.refresh_geometry();

        self.line_feed = self.line_feed.max(other.line_feed);
        self.height = self.height.max(other.height);
        self.width = self.width.max(other.width);
        self.max_width = self.cell_width;

        if !self.glyphs.is_empty() {
            self.num_sheets =
                ((self.glyphs.len() - 1) / self.glyphs_per_sheet as usize + 1) as u16;
        }

        cmap::coalesce_cmaps(&mut self.cmaps);
    }

    fn refresh_geometry(&mut self) {
        self.glyph_width = self.cell_width as u16 + 1;
        self.glyph_height = self.cell_height as u16 + 1;
        self.glyphs_per_row = self.sheet_width / self.glyph_width;
        self.glyphs_per_col = self.sheet_height / self.glyph_height;
        self.glyphs_per_sheet = self.glyphs_per_row.saturating_mul(self.glyphs_per_col);
    }

    /// Replacement-character glyph index: 0xFFFD, else '?', else ' ',
    /// else 0.
    fn pick_alt_index(&self) -> u16 {
        for candidate in [0xFFFD, '?' as u16, ' ' as u16] {
            if let Some(position) = self.glyphs.keys().position(|&c| c == candidate) {
                return position as u16;
            }
        }
        0
    }

    /// The code point a glyph index maps to, or 0xFFFF.
    fn codepoint(&self, index: u16) -> u16 {
        for cmap in &self.cmaps {
            let code = cmap.code_point_from_index(index);
            if code != 0xFFFF {
                return code;
            }
        }
        0xFFFF
    }

    fn geometry(&self) -> SheetGeometry {
        SheetGeometry {
            glyph_width: self.glyph_width as u32,
            glyph_height: self.glyph_height as u32,
            glyphs_per_row: self.glyphs_per_row as u32,
            glyphs_per_col: self.glyphs_per_col as u32,
            ascent: self.ascent as i32,
        }
    }

    /// Rasterize and pack every sheet, in parallel, in glyph order.
    fn build_sheet_data(&self) -> Vec<Vec<u8>> {
        let geometry = self.geometry();
        let per_sheet = geometry.glyphs_per_sheet();

        let chunks: Vec<Vec<Glyph>> = self
            .glyphs
            .values()
            .cloned()
            .collect::<Vec<_>>()
            .chunks(per_sheet)
            .map(|c| c.to_vec())
            .collect();

        let results = std::sync::Arc::new(Mutex::new(vec![None; chunks.len()]));

        let pool = WorkerPool::new();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let results = std::sync::Arc::clone(&results);
            pool.execute(move || {
                let refs: Vec<&Glyph> = chunk.iter().collect();
                let packed = sheet::pack_sheet(sheet::build_sheet(&refs, &geometry));
                results.lock().expect("sheet results poisoned")[index] = Some(packed);
            });
        }
        drop(pool);

        std::sync::Arc::try_unwrap(results)
            .ok()
            .expect("sheet workers joined")
            .into_inner()
            .expect("sheet results poisoned")
            .into_iter()
            .map(|sheet| sheet.expect("every sheet built"))
            .collect()
    }

    /// Serialize to the BCFNT wire format.
    pub fn serialize(&self) -> Result<Vec<u8>, BcfntError> {
        if self.glyphs.is_empty() {
            return Err(BcfntError::EmptyFont);
        }

        let glyph_count = self.glyphs.len();
        let cwdh_data = (3 * glyph_count + 3) & !3;

        let finf_offset = 0x14usize;
        let tglp_offset = finf_offset + 0x20;
        let sheet_offset = (tglp_offset + 0x20 + 0x7F) & !0x7F;
        let cwdh_offset = sheet_offset + self.num_sheets as usize * SHEET_SIZE;
        let first_cmap_offset = cwdh_offset + 0x10 + cwdh_data;

        let cmap_sizes: Vec<usize> = self.cmaps.iter().map(cmap_block_size).collect();
        let file_size = first_cmap_offset + cmap_sizes.iter().sum::<usize>();

        let mut out = Vec::with_capacity(file_size);

        // CFNT header
        out.extend_from_slice(b"CFNT");
        out.extend_from_slice(&0xFEFFu16.to_le_bytes());
        out.extend_from_slice(&0x14u16.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 3]); // version
        out.extend_from_slice(&(file_size as u32).to_le_bytes());
        out.extend_from_slice(&(3 + self.cmaps.len() as u32).to_le_bytes());

        // FINF
        debug_assert_eq!(out.len(), finf_offset);
        out.extend_from_slice(b"FINF");
        out.extend_from_slice(&0x20u32.to_le_bytes());
        out.push(0x1); // font type
        out.push(self.line_feed);
        out.extend_from_slice(&self.alt_index.to_le_bytes());
        out.push(self.default_width.left as u8);
        out.push(self.default_width.glyph_width);
        out.push(self.default_width.char_width);
        out.push(0x1); // encoding
        out.extend_from_slice(&((tglp_offset + 8) as u32).to_le_bytes());
        out.extend_from_slice(&((cwdh_offset + 8) as u32).to_le_bytes());
        out.extend_from_slice(&((first_cmap_offset + 8) as u32).to_le_bytes());
        out.push(self.height);
        out.push(self.width);
        out.push(self.ascent);
        out.push(0x0);

        // TGLP
        debug_assert_eq!(out.len(), tglp_offset);
        out.extend_from_slice(b"TGLP");
        out.extend_from_slice(&0x20u32.to_le_bytes());
        out.push(self.cell_width);
        out.push(self.cell_height);
        out.push(self.ascent); // baseline
        out.push(self.max_width);
        out.extend_from_slice(&self.sheet_size.to_le_bytes());
        out.extend_from_slice(&self.num_sheets.to_le_bytes());
        out.extend_from_slice(&0xBu16.to_le_bytes()); // 4-bit alpha
        out.extend_from_slice(&self.glyphs_per_row.to_le_bytes());
        out.extend_from_slice(&self.glyphs_per_col.to_le_bytes());
        out.extend_from_slice(&self.sheet_width.to_le_bytes());
        out.extend_from_slice(&self.sheet_height.to_le_bytes());
        out.extend_from_slice(&(sheet_offset as u32).to_le_bytes());

        // Sheet data, 128-byte aligned.
        out.resize(sheet_offset, 0);
        for packed in self.build_sheet_data() {
            out.extend_from_slice(&packed);
        }

        // CWDH
        debug_assert_eq!(out.len(), cwdh_offset);
        out.extend_from_slice(b"CWDH");
        out.extend_from_slice(&((0x10 + cwdh_data) as u32).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // start index
        out.extend_from_slice(&(glyph_count as u16).to_le_bytes()); // end index
        out.extend_from_slice(&0u32.to_le_bytes()); // next CWDH
        for glyph in self.glyphs.values() {
            out.push(glyph.info.left as u8);
            out.push(glyph.info.glyph_width);
            out.push(glyph.info.char_width);
        }
        while out.len() % 4 != 0 {
            out.push(0);
        }

        // CMAP chain
        let mut cmap_offset = first_cmap_offset;
        for (i, cmap) in self.cmaps.iter().enumerate() {
            debug_assert_eq!(out.len(), cmap_offset);
            let size = cmap_sizes[i];

            out.extend_from_slice(b"CMAP");
            out.extend_from_slice(&(size as u32).to_le_bytes());
            out.extend_from_slice(&cmap.code_begin.to_le_bytes());
            out.extend_from_slice(&cmap.code_end.to_le_bytes());
            out.extend_from_slice(&cmap.data.mapping_method().to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // reserved

            if i + 1 == self.cmaps.len() {
                out.extend_from_slice(&0u32.to_le_bytes());
            } else {
                out.extend_from_slice(&((cmap_offset + size + 8) as u32).to_le_bytes());
            }

            match &cmap.data {
                CmapData::Direct(offset) => {
                    out.extend_from_slice(&offset.to_le_bytes());
                    out.extend_from_slice(&0u16.to_le_bytes()); // alignment
                }
                CmapData::Table(table) => {
                    for &index in table {
                        out.extend_from_slice(&index.to_le_bytes());
                    }
                    if table.len() % 2 != 0 {
                        out.extend_from_slice(&0u16.to_le_bytes());
                    }
                }
                CmapData::Scan(entries) => {
                    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
                    for (&code, &index) in entries {
                        out.extend_from_slice(&code.to_le_bytes());
                        out.extend_from_slice(&index.to_le_bytes());
                    }
                    out.extend_from_slice(&0u16.to_le_bytes()); // alignment
                }
            }

            cmap_offset += size;
        }

        debug_assert_eq!(out.len(), file_size);
        debug!(glyphs = glyph_count, bytes = out.len(), "font serialized");
        Ok(out)
    }

    /// Parse a serialized BCFNT back into an editable font.
    pub fn parse(data: &[u8]) -> Result<Self, BcfntError> {
        let mut r = Reader::new(data);

        if r.bytes(4)? != b"CFNT" {
            return Err(BcfntError::BadMagic);
        }
        if r.u16()? != 0xFEFF {
            return Err(BcfntError::BigEndian);
        }
        r.skip(2)?; // header size
        r.skip(4)?; // version
        r.skip(4)?; // file size
        r.skip(4)?; // block count

        r.skip(4)?; // FINF magic
        r.skip(4)?; // section size
        r.skip(1)?; // font type

        let mut font = Bcfnt::new();
        font.line_feed = r.u8()?;
        font.alt_index = r.u16()?;
        font.default_width = CharWidthInfo {
            left: r.u8()? as i8,
            glyph_width: r.u8()?,
            char_width: r.u8()?,
        };
        r.skip(1)?; // encoding

        let tglp_offset = r.u32()? as usize;
        let cwdh_start = r.u32()? as usize;
        let cmap_start = r.u32()? as usize;

        font.height = r.u8()?;
        font.width = r.u8()?;
        font.ascent = r.u8()?;

        // CMAP chain first; sheet read-back needs the index mapping.
        let mut cmap_offset = cmap_start;
        while cmap_offset != 0 {
            r.seek(cmap_offset.checked_sub(4).ok_or(BcfntError::Truncated)?)?;
            r.skip(4)?; // section size

            let code_begin = r.u16()?;
            let code_end = r.u16()?;
            let method = r.u16()?;
            r.skip(2)?; // reserved
            cmap_offset = r.u32()? as usize;

            if code_end < code_begin {
                return Err(BcfntError::Font("inverted CMAP code range".into()));
            }

            let data = match method {
                MAPPING_DIRECT => CmapData::Direct(r.u16()?),
                MAPPING_TABLE => {
                    let mut table = Vec::with_capacity((code_end - code_begin + 1) as usize);
                    for _ in code_begin..=code_end {
                        table.push(r.u16()?);
                    }
                    CmapData::Table(table)
                }
                MAPPING_SCAN => {
                    let count = r.u16()?;
                    let mut entries = BTreeMap::new();
                    for _ in 0..count {
                        let code = r.u16()?;
                        let index = r.u16()?;
                        entries.insert(code, index);
                    }
                    CmapData::Scan(entries)
                }
                other => return Err(BcfntError::UnsupportedMappingMethod(other)),
            };

            font.cmaps.push(Cmap {
                code_begin,
                code_end,
                data,
            });
        }

        // TGLP
        r.seek(tglp_offset)?;
        font.cell_width = r.u8()?;
        font.cell_height = r.u8()?;
        r.skip(1)?; // baseline
        font.max_width = r.u8()?;
        font.sheet_size = r.u32()?;
        font.num_sheets = r.u16()?;

        let sheet_format = r.u16()?;
        if sheet_format != 0xB {
            return Err(BcfntError::UnsupportedSheetFormat(sheet_format));
        }

        font.glyphs_per_row = r.u16()?;
        font.glyphs_per_col = r.u16()?;
        font.sheet_width = r.u16()?;
        font.sheet_height = r.u16()?;
        font.glyph_width = font.cell_width as u16 + 1;
        font.glyph_height = font.cell_height as u16 + 1;
        font.glyphs_per_sheet = font.glyphs_per_row.saturating_mul(font.glyphs_per_col);

        if font.sheet_width == 0
            || font.sheet_height == 0
            || font.sheet_width % 8 != 0
            || font.sheet_height % 8 != 0
        {
            return Err(BcfntError::Font("sheet dimensions must be tile-aligned".into()));
        }
        if font.sheet_width as u32 * font.sheet_height as u32 / 2 != font.sheet_size {
            return Err(BcfntError::Font("sheet size mismatch".into()));
        }

        let sheet_data_offset = r.u32()? as usize;
        r.seek(sheet_data_offset)?;

        for sheet_index in 0..font.num_sheets {
            let packed = r.bytes(font.sheet_size as usize)?;
            let unpacked =
                sheet::unpack_sheet(packed, font.sheet_width as u32, font.sheet_height as u32);

            for row in 0..font.glyphs_per_col as u32 {
                for col in 0..font.glyphs_per_row as u32 {
                    let index = sheet_index as u32 * font.glyphs_per_sheet as u32
                        + row * font.glyphs_per_row as u32
                        + col;
                    if index > u16::MAX as u32 {
                        continue;
                    }

                    let code = font.codepoint(index as u16);
                    if code == 0xFFFF {
                        continue;
                    }

                    let image = image::imageops::crop_imm(
                        &unpacked,
                        col * font.glyph_width as u32 + 1,
                        row * font.glyph_height as u32 + 1,
                        font.cell_width as u32,
                        font.cell_height as u32,
                    )
                    .to_image();

                    font.glyphs.insert(
                        code,
                        Glyph {
                            image,
                            info: CharWidthInfo::default(),
                            ascent: font.ascent as i32,
                        },
                    );
                }
            }
        }

        // CWDH chain
        let mut cwdh_offset = cwdh_start;
        while cwdh_offset != 0 {
            r.seek(cwdh_offset.checked_sub(4).ok_or(BcfntError::Truncated)?)?;
            r.skip(4)?; // section size

            let start_index = r.u16()?;
            let end_index = r.u16()?;
            cwdh_offset = r.u32()? as usize;

            for index in start_index..end_index {
                let info = CharWidthInfo {
                    left: r.u8()? as i8,
                    glyph_width: r.u8()?,
                    char_width: r.u8()?,
                };

                let code = font.codepoint(index);
                if let Some(glyph) = font.glyphs.get_mut(&code) {
                    glyph.info = info;
                }
            }
        }

        Ok(font)
    }
}

struct IngestState {
    glyphs: Vec<(u16, Glyph)>,
    ascent: i32,
    descent: i32,
    max_width: u32,
    height: u32,
    width: u32,
}

fn cmap_block_size(cmap: &Cmap) -> usize {
    0x14 + match &cmap.data {
        CmapData::Direct(_) => 4,
        CmapData::Table(table) => table.len() * 2 + (table.len() % 2) * 2,
        CmapData::Scan(entries) => 4 + entries.len() * 4,
    }
}

/// Little-endian cursor over a byte slice.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], BcfntError> {
        let end = self.pos.checked_add(len).ok_or(BcfntError::Truncated)?;
        if end > self.data.len() {
            return Err(BcfntError::Truncated);
        }
        let out = &self.data[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn skip(&mut self, len: usize) -> Result<(), BcfntError> {
        self.bytes(len).map(|_| ())
    }

    fn seek(&mut self, pos: usize) -> Result<(), BcfntError> {
        if pos > self.data.len() {
            return Err(BcfntError::Truncated);
        }
        self.pos = pos;
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, BcfntError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, BcfntError> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, BcfntError> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}
