//! CLI error handling.

use std::fmt;
use std::path::PathBuf;
use std::process;
use tex3ds::bcfnt::BcfntError;
use tex3ds::texture::TextureError;

/// CLI-level errors with user-facing messages.
#[derive(Debug)]
pub enum CliError {
    /// Bad or missing option combination.
    Usage(String),
    /// Failed to read or decode an input image.
    Image { path: PathBuf, error: image::ImageError },
    /// Failed to read or write a file.
    Io { path: PathBuf, error: std::io::Error },
    /// Texture pipeline failure.
    Texture(TextureError),
    /// Font pipeline failure.
    Font(BcfntError),
}

impl CliError {
    /// Print the error and exit with a nonzero status.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Image { path, error } => {
                write!(f, "failed to load image '{}': {}", path.display(), error)
            }
            CliError::Io { path, error } => {
                write!(f, "'{}': {}", path.display(), error)
            }
            CliError::Texture(e) => write!(f, "{}", e),
            CliError::Font(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Image { error, .. } => Some(error),
            CliError::Io { error, .. } => Some(error),
            CliError::Texture(e) => Some(e),
            CliError::Font(e) => Some(e),
            CliError::Usage(_) => None,
        }
    }
}

impl From<TextureError> for CliError {
    fn from(error: TextureError) -> Self {
        CliError::Texture(error)
    }
}

impl From<BcfntError> for CliError {
    fn from(error: BcfntError) -> Self {
        CliError::Font(error)
    }
}
