//! Error types for cmap surgery and font rebuilding.

use std::{io, path::PathBuf, result};

use read_fonts::types::Tag;

#[derive(Debug, thiserror::Error)]
pub enum RemapError {
    #[error(transparent)]
    Font(#[from] galfont_font_ops::Error),

    #[error("required table '{0}' not found")]
    MissingTable(Tag),

    #[error("font would need {0} glyphs after transplanting, more than a font can hold")]
    TooManyGlyphs(usize),

    #[error("failed to read conversion table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl From<read_fonts::ReadError> for RemapError {
    fn from(e: read_fonts::ReadError) -> Self {
        Self::Font(e.into())
    }
}

impl From<write_fonts::BuilderError> for RemapError {
    fn from(e: write_fonts::BuilderError) -> Self {
        Self::Font(e.into())
    }
}

impl From<write_fonts::error::Error> for RemapError {
    fn from(e: write_fonts::error::Error) -> Self {
        Self::Font(e.into())
    }
}

pub type Result<T> = result::Result<T, RemapError>;
