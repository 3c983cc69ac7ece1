//! `tex3ds texture` subcommand.

use crate::error::CliError;
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tex3ds::atlas::AtlasInput;
use tex3ds::compress::CompressionFormat;
use tex3ds::encode::{FormatRequest, PixelFormat};
use tex3ds::etc1;
use tex3ds::texture::{MipmapFilter, ProcessingMode, Tex3dsEncoder, TextureConfig};

#[derive(Debug, Clone, ValueEnum)]
enum FormatArg {
    #[value(alias = "rgba", alias = "rgba8")]
    Rgba8888,
    #[value(alias = "rgb", alias = "rgb8")]
    Rgb888,
    Rgba5551,
    Rgb565,
    #[value(alias = "rgba4")]
    Rgba4444,
    #[value(alias = "la", alias = "la8")]
    La88,
    #[value(alias = "hilo", alias = "hilo8")]
    Hilo88,
    #[value(alias = "l")]
    L8,
    #[value(alias = "a")]
    A8,
    #[value(alias = "la4")]
    La44,
    L4,
    A4,
    Etc1,
    Etc1a4,
    AutoL8,
    AutoL4,
    AutoEtc1,
}

impl From<FormatArg> for FormatRequest {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Rgba8888 => FormatRequest::Exact(PixelFormat::Rgba8888),
            FormatArg::Rgb888 => FormatRequest::Exact(PixelFormat::Rgb888),
            FormatArg::Rgba5551 => FormatRequest::Exact(PixelFormat::Rgba5551),
            FormatArg::Rgb565 => FormatRequest::Exact(PixelFormat::Rgb565),
            FormatArg::Rgba4444 => FormatRequest::Exact(PixelFormat::Rgba4444),
            FormatArg::La88 => FormatRequest::Exact(PixelFormat::La88),
            FormatArg::Hilo88 => FormatRequest::Exact(PixelFormat::Hilo88),
            FormatArg::L8 => FormatRequest::Exact(PixelFormat::L8),
            FormatArg::A8 => FormatRequest::Exact(PixelFormat::A8),
            FormatArg::La44 => FormatRequest::Exact(PixelFormat::La44),
            FormatArg::L4 => FormatRequest::Exact(PixelFormat::L4),
            FormatArg::A4 => FormatRequest::Exact(PixelFormat::A4),
            FormatArg::Etc1 => FormatRequest::Exact(PixelFormat::Etc1),
            FormatArg::Etc1a4 => FormatRequest::Exact(PixelFormat::Etc1A4),
            FormatArg::AutoL8 => FormatRequest::AutoL8,
            FormatArg::AutoL4 => FormatRequest::AutoL4,
            FormatArg::AutoEtc1 => FormatRequest::AutoEtc1,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum CompressArg {
    Auto,
    None,
    #[value(alias = "lzss")]
    Lz10,
    Lz11,
    Rle,
    #[value(alias = "huffman")]
    Huff,
}

impl From<CompressArg> for CompressionFormat {
    fn from(arg: CompressArg) -> Self {
        match arg {
            CompressArg::Auto => CompressionFormat::Auto,
            CompressArg::None => CompressionFormat::None,
            CompressArg::Lz10 => CompressionFormat::Lz10,
            CompressArg::Lz11 => CompressionFormat::Lz11,
            CompressArg::Rle => CompressionFormat::Rle,
            CompressArg::Huff => CompressionFormat::Huffman,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum FilterArg {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<FilterArg> for MipmapFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Nearest => MipmapFilter::Nearest,
            FilterArg::Triangle => MipmapFilter::Triangle,
            FilterArg::CatmullRom => MipmapFilter::CatmullRom,
            FilterArg::Gaussian => MipmapFilter::Gaussian,
            FilterArg::Lanczos3 => MipmapFilter::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum QualityArg {
    Low,
    #[value(alias = "med")]
    Medium,
    High,
}

impl From<QualityArg> for etc1::Quality {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::Low => etc1::Quality::Low,
            QualityArg::Medium => etc1::Quality::Medium,
            QualityArg::High => etc1::Quality::High,
        }
    }
}

#[derive(Debug, Args)]
pub struct TextureArgs {
    /// Input image file(s)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pixel format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Rgba8888)]
    format: FormatArg,

    /// Compress output
    #[arg(short = 'z', long = "compress", value_enum, default_value_t = CompressArg::Auto)]
    compress: CompressArg,

    /// Generate mipmaps with the given filter
    #[arg(short, long, value_enum)]
    mipmap: Option<FilterArg>,

    /// ETC1 quality
    #[arg(short, long, value_enum, default_value_t = QualityArg::Medium)]
    quality: QualityArg,

    /// Generate a texture atlas
    #[arg(long, conflicts_with_all = ["cubemap", "skybox"])]
    atlas: bool,

    /// Generate a cubemap from a 4:3 sheet
    #[arg(long, conflicts_with = "skybox")]
    cubemap: bool,

    /// Generate a skybox from a 4:3 sheet
    #[arg(long)]
    skybox: bool,

    /// Trim input image(s) to their non-transparent extent
    #[arg(short, long)]
    trim: bool,

    /// Transparent border around atlas entries, in pixels
    #[arg(short, long, default_value_t = 0)]
    border: u32,

    /// Output image data only, without the container header
    #[arg(short, long)]
    raw: bool,

    /// Output a preview image of the quantized result
    #[arg(short, long)]
    preview: Option<PathBuf>,
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn run(args: TextureArgs) -> Result<(), CliError> {
    let mode = if args.atlas {
        ProcessingMode::Atlas
    } else if args.cubemap {
        ProcessingMode::Cubemap
    } else if args.skybox {
        ProcessingMode::Skybox
    } else {
        ProcessingMode::Normal
    };

    if args.inputs.len() > 1 && mode != ProcessingMode::Atlas {
        return Err(CliError::Usage(
            "multiple inputs are only supported with --atlas".into(),
        ));
    }

    let mut inputs = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        let image = image::open(path)
            .map_err(|error| CliError::Image {
                path: path.clone(),
                error,
            })?
            .to_rgba8();

        inputs.push(AtlasInput {
            name: basename(path),
            image,
        });
    }

    let mut config = TextureConfig::new(args.format.clone().into())
        .with_compression(args.compress.clone().into())
        .with_etc1_quality(args.quality.clone().into())
        .with_mode(mode)
        .with_trim(args.trim)
        .with_border(args.border)
        .with_preview(args.preview.is_some());

    if let Some(filter) = args.mipmap.clone() {
        config = config.with_mipmap_filter(filter.into());
    }

    let texture = Tex3dsEncoder::new(config).encode(inputs)?;

    if let Some(output) = &args.output {
        let file = File::create(output).map_err(|error| CliError::Io {
            path: output.clone(),
            error,
        })?;
        texture
            .write_to(&mut BufWriter::new(file), args.raw)
            .map_err(CliError::Texture)?;
    }

    if let Some(preview_path) = &args.preview {
        for (prefix, preview) in &texture.previews {
            let path = prefixed_path(preview_path, prefix);
            preview.save(&path).map_err(|error| CliError::Image {
                path,
                error,
            })?;
        }
    }

    Ok(())
}

/// Prefix the file name of `path` (cubemap faces get `px_` etc.).
fn prefixed_path(path: &Path, prefix: &str) -> PathBuf {
    if prefix.is_empty() {
        return path.to_path_buf();
    }

    let name = basename(path);
    path.with_file_name(format!("{}{}", prefix, name))
}
