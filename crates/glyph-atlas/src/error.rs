//! Error types for atlas generation.

use std::{io, path::PathBuf, result};

#[derive(Debug, thiserror::Error)]
pub enum AtlasError {
    #[error("texture of {texture_size}px cannot hold glyph U+{code:04X} ({width}x{height}); increase the texture size")]
    Overflow {
        code: u32,
        width: u32,
        height: u32,
        texture_size: u32,
    },

    #[error("invalid font data: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),

    #[error("font size must be positive")]
    InvalidSize,

    #[error("'{0}' cannot be encoded in CP932")]
    Encoding(String),

    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AtlasError {
    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T> = result::Result<T, AtlasError>;
