//! Texture conversion pipeline.
//!
//! Turns one or more RGBA images into a Tex3DS container: optional atlas
//! packing, power-of-two normalization, mipmap generation, Morton
//! swizzling, per-tile pixel encoding on the worker pool, and payload
//! compression.

mod config;
mod container;
mod mipmap;
mod pipeline;

pub use config::{ProcessingMode, TextureConfig};
pub use mipmap::{MipmapFilter, MipmapGenerator};
pub use pipeline::{EncodedTexture, Tex3dsEncoder};

use crate::atlas::AtlasError;
use thiserror::Error;

/// Errors from the texture pipeline.
#[derive(Debug, Error)]
pub enum TextureError {
    /// Dimensions cannot be represented: too large, or (for cubemaps and
    /// skyboxes) the 4:3 layout does not divide into valid faces.
    #[error("invalid dimensions {0}x{1}")]
    InvalidDimension(u32, u32),

    /// More than one input outside atlas mode.
    #[error("multiple inputs are only supported in atlas mode")]
    MultipleInputs,

    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
