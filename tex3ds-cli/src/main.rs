//! Tex3DS CLI - texture and font conversion for the Nintendo 3DS.
//!
//! Two subcommands front the library:
//! - `texture`: convert images to a Tex3DS container
//! - `font`: build a BCFNT from scalable fonts and/or existing BCFNTs
//!
//! Argument parsing is clap-derived; errors funnel through [`CliError`]
//! for consistent messages and exit codes.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use error::CliError;

#[derive(Parser)]
#[command(name = "tex3ds")]
#[command(version = tex3ds::VERSION)]
#[command(about = "Nintendo 3DS texture and font converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert images into a Tex3DS texture
    Texture(commands::texture::TextureArgs),

    /// Build a BCFNT font from scalable fonts or existing BCFNTs
    Font(commands::font::FontArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Texture(args) => commands::texture::run(args),
        Commands::Font(args) => commands::font::run(args),
    };

    if let Err(error) = result {
        error.exit();
    }
}
