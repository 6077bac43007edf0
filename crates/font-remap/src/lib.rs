//! cmap surgery for localization disguise.
//!
//! [`rebuild`] rewrites the Windows cmap subtables of a font so that each
//! target code point shows the glyph of its source code point, optionally
//! after transplanting missing glyphs from a fallback font, and then renames
//! the font and sets its Japanese code-page bits.

mod cmap_edit;
mod convert;
mod error;
pub mod metadata;
mod mode;
mod rebuild;
mod report;
mod transplant;

pub use convert::{DictionaryConverter, ScriptConverter};
pub use error::{RemapError, Result};
pub use mode::RemapMode;
pub use rebuild::{RemapOutput, RemapRequest, rebuild};
pub use report::{MISSING_DISPLAY_LIMIT, RemapReport, RemapWarning, SubtableCount};
