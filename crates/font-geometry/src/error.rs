//! Error types for geometry transforms.

use std::result;

use read_fonts::types::Tag;

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error(transparent)]
    Font(#[from] galfont_font_ops::Error),

    #[error("required table '{0}' not found; convert the font to glyf outlines first")]
    MissingTable(Tag),

    #[error("scale factors must be positive and finite, got ({sx}, {sy})")]
    InvalidScale { sx: f64, sy: f64 },
}

impl From<read_fonts::ReadError> for GeometryError {
    fn from(e: read_fonts::ReadError) -> Self {
        Self::Font(e.into())
    }
}

pub type Result<T> = result::Result<T, GeometryError>;
