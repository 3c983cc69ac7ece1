//! Tex3DS - Nintendo 3DS texture and font conversion
//!
//! This library converts source image and font assets into the 3DS's
//! native containers: Tex3DS textures (swizzled, per-tile encoded in one
//! of fourteen PICA 200 pixel formats, optionally mipmapped and
//! compressed) and BCFNT fonts (glyphs rasterized onto swizzled 4-bit
//! alpha sheets with width and code-mapping tables).
//!
//! # Texture conversion
//!
//! ```no_run
//! use tex3ds::atlas::AtlasInput;
//! use tex3ds::encode::{FormatRequest, PixelFormat};
//! use tex3ds::texture::{Tex3dsEncoder, TextureConfig};
//!
//! let image = image::open("in.png").unwrap().to_rgba8();
//!
//! let config = TextureConfig::new(FormatRequest::Exact(PixelFormat::Rgba8888));
//! let texture = Tex3dsEncoder::new(config)
//!     .encode(vec![AtlasInput { name: "in.png".into(), image }])
//!     .unwrap();
//!
//! std::fs::write("out.t3x", texture.to_bytes(false)).unwrap();
//! ```
//!
//! # Font conversion
//!
//! ```no_run
//! use tex3ds::bcfnt::{Bcfnt, CodeFilter, FontFace};
//!
//! let data = std::fs::read("font.ttf").unwrap();
//! let face = FontFace::from_bytes(&data, 22.0).unwrap();
//!
//! let mut font = Bcfnt::new();
//! font.add_face(&face, &CodeFilter::allow_all());
//!
//! std::fs::write("font.bcfnt", font.serialize().unwrap()).unwrap();
//! ```

pub mod atlas;
pub mod bcfnt;
pub mod compress;
pub mod encode;
pub mod etc1;
pub mod pool;
pub mod quant;
pub mod swizzle;
pub mod texture;

/// Version of the library and CLI, synchronized across the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
