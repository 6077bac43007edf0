//! Error types for font table access and rewriting.

use std::{io, path::PathBuf, result};

use read_fonts::{ReadError, types::Tag};
use write_fonts::{BuilderError, error::Error as WriteError, tables::cmap::CmapConflict};

/// Errors that can occur while reading or rebuilding a font.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to write table: {0}")]
    Write(#[from] WriteError),

    #[error("required table '{0}' not found")]
    MissingTable(Tag),

    #[error(transparent)]
    CmapConflict(#[from] CmapConflict),

    #[error("format 4 cmap too large: {segments} segments, {glyph_ids} glyph ids")]
    Format4Overflow { segments: usize, glyph_ids: usize },

    #[error("failed to convert outline of glyph {glyph}: {reason}")]
    Outline { glyph: u32, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = result::Result<T, Error>;
