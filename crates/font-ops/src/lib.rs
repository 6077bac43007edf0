//! Typed font table access and table-level rewriting.
//!
//! Every other crate in the workspace goes through this one to read a font
//! ([`FontTables`]), to rebuild it with some tables replaced
//! ([`rewrite_font`]), and to emit new cmap subtables ([`encode_subtable`]).

mod cache;
pub mod cleanup;
pub mod cmap;
mod error;
pub mod glyph;
pub mod normalize;
mod rewrite;
mod tables;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{CachedFont, CharsetCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_MAX_AGE};
pub use cleanup::{CleanupOptions, CleanupReport, clean_tables};
pub use cmap::encode_subtable;
pub use error::{Error, Result};
pub use normalize::normalize_to_quadratic;
pub use rewrite::{
    NameEntry, copy_all_tables, map_name_records, replace_name_records, rewrite_font,
    rewrite_font_without,
};
pub use tables::{CFF, CFF2, FontTables};
