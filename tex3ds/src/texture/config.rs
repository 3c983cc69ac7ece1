//! Texture pipeline configuration.

use super::mipmap::MipmapFilter;
use crate::compress::CompressionFormat;
use crate::encode::FormatRequest;
use crate::encode::PixelFormat;
use crate::etc1;

/// How the input image set is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// One image, converted as-is.
    #[default]
    Normal,
    /// Many images packed into one atlas.
    Atlas,
    /// One 4:3 image sliced into six cubemap faces.
    Cubemap,
    /// One 4:3 image sliced into six skybox faces.
    Skybox,
}

/// Configuration for one texture conversion.
///
/// Collects every pipeline choice in one record, constructed by the CLI
/// and handed to [`super::Tex3dsEncoder`].
///
/// # Example
///
/// ```
/// use tex3ds::texture::{ProcessingMode, TextureConfig};
/// use tex3ds::encode::{FormatRequest, PixelFormat};
///
/// let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgb565))
///     .with_mode(ProcessingMode::Atlas)
///     .with_trim(true)
///     .with_border(1);
/// assert_eq!(config.border(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureConfig {
    format: FormatRequest,
    compression: CompressionFormat,
    mipmap_filter: Option<MipmapFilter>,
    etc1_quality: etc1::Quality,
    mode: ProcessingMode,
    trim: bool,
    border: u32,
    preview: bool,
}

impl TextureConfig {
    pub fn new(format: FormatRequest) -> Self {
        Self {
            format,
            compression: CompressionFormat::Auto,
            mipmap_filter: None,
            etc1_quality: etc1::Quality::Medium,
            mode: ProcessingMode::Normal,
            trim: false,
            border: 0,
            preview: false,
        }
    }

    pub fn with_compression(mut self, compression: CompressionFormat) -> Self {
        self.compression = compression;
        self
    }

    /// Enable mipmap generation with the given downsampling filter.
    pub fn with_mipmap_filter(mut self, filter: MipmapFilter) -> Self {
        self.mipmap_filter = Some(filter);
        self
    }

    pub fn with_etc1_quality(mut self, quality: etc1::Quality) -> Self {
        self.etc1_quality = quality;
        self
    }

    pub fn with_mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Crop inputs to their non-transparent bounding box before packing.
    pub fn with_trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    /// Transparent spacing kept around every atlas entry, in pixels.
    pub fn with_border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }

    /// Also produce a preview image of the quantized output.
    pub fn with_preview(mut self, preview: bool) -> Self {
        self.preview = preview;
        self
    }

    pub fn format(&self) -> FormatRequest {
        self.format
    }

    pub fn compression(&self) -> CompressionFormat {
        self.compression
    }

    pub fn mipmap_filter(&self) -> Option<MipmapFilter> {
        self.mipmap_filter
    }

    pub fn etc1_quality(&self) -> etc1::Quality {
        self.etc1_quality
    }

    pub fn mode(&self) -> ProcessingMode {
        self.mode
    }

    pub fn trim(&self) -> bool {
        self.trim
    }

    pub fn border(&self) -> u32 {
        self.border
    }

    pub fn preview(&self) -> bool {
        self.preview
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self::new(FormatRequest::Exact(PixelFormat::Rgba8888))
    }
}
