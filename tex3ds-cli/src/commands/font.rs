//! `tex3ds font` subcommand.

use crate::error::CliError;
use clap::Args;
use std::path::PathBuf;
use tex3ds::bcfnt::{Bcfnt, CodeFilter, FontFace};
use tracing::info;

#[derive(Debug, Args)]
pub struct FontArgs {
    /// Input font file(s); lower numbers get priority. Scalable fonts and
    /// BCFNT files may be mixed.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Font size in points
    #[arg(short, long, default_value_t = 22.0)]
    size: f64,

    /// Exclude the whitespace-separated list of code points in this file
    #[arg(short, long, conflicts_with = "whitelist")]
    blacklist: Option<PathBuf>,

    /// Include only the whitespace-separated list of code points in this
    /// file
    #[arg(short, long)]
    whitelist: Option<PathBuf>,
}

/// Parse a whitespace-separated code point list; `0x` hex accepted.
fn parse_code_list(path: &PathBuf) -> Result<Vec<u16>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|error| CliError::Io {
        path: path.clone(),
        error,
    })?;

    let mut codes = Vec::new();
    for token in text.split_whitespace() {
        let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
            u16::from_str_radix(hex, 16)
        } else {
            token.parse()
        };

        match parsed {
            Ok(code) => codes.push(code),
            Err(_) => {
                return Err(CliError::Usage(format!(
                    "invalid code point '{}' in {}",
                    token,
                    path.display()
                )))
            }
        }
    }

    Ok(codes)
}

pub fn run(args: FontArgs) -> Result<(), CliError> {
    if !args.size.is_finite() || args.size <= 0.0 {
        return Err(CliError::Usage(format!("invalid point size {}", args.size)));
    }

    let filter = if let Some(path) = &args.whitelist {
        CodeFilter::whitelist(parse_code_list(path)?)
    } else if let Some(path) = &args.blacklist {
        CodeFilter::blacklist(parse_code_list(path)?)
    } else {
        CodeFilter::allow_all()
    };

    let mut font = Bcfnt::new();

    for input in &args.inputs {
        let data = std::fs::read(input).map_err(|error| CliError::Io {
            path: input.clone(),
            error,
        })?;

        if data.starts_with(b"CFNT") {
            let parsed = Bcfnt::parse(&data)?;
            font.merge(&parsed, &filter);
        } else {
            let face = FontFace::from_bytes(&data, args.size)?;
            font.add_face(&face, &filter);
        }
    }

    let serialized = font.serialize()?;
    std::fs::write(&args.output, serialized).map_err(|error| CliError::Io {
        path: args.output.clone(),
        error,
    })?;

    info!(glyphs = font.glyph_count(), "font generated");
    println!("Generated font with {} glyphs", font.glyph_count());

    Ok(())
}
