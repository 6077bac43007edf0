//! Character-driven subsetting on top of hb-subset.
//!
//! The subset keeps exactly the glyphs reachable from a character universe
//! (plus `.notdef` with its outline), all name records and the glyph names,
//! and drops embedded bitmap tables. It operates purely on byte slices.
//!
//! # Example
//!
//! ```no_run
//! use galfont_font_subsetter::Subsetter;
//!
//! let font_data: &[u8] = &[];
//! let subset = Subsetter::new().with_characters("こんにちは".chars()).subset(font_data);
//! ```

use std::collections::BTreeSet;

use galfont_charmap::{CharacterMapping, text::is_printable};
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::{debug, info};

/// Embedded bitmap tables dropped from every subset.
pub const BITMAP_TABLES_TO_DROP: &[&[u8; 4]] = &[b"EBDT", b"EBLC", b"EBSC", b"CBDT", b"CBLC"];

/// Control characters kept in the universe even though they are not printable.
pub const KEPT_CONTROLS: [char; 3] = ['\n', '\r', '\t'];

/// Highest name id kept; covers every predefined and font-specific id.
const MAX_NAME_ID: u32 = 0x7FFF;

#[derive(Debug, thiserror::Error)]
pub enum SubsetError {
    #[error("no characters to keep; the subset would be empty")]
    EmptyCharacterSet,

    #[error("hb-subset failed: {0}")]
    HarfBuzz(String),
}

pub type Result<T> = std::result::Result<T, SubsetError>;

/// The characters a corpus and mapping need: every corpus character plus
/// both sides of every mapping entry, limited to printable characters and
/// [`KEPT_CONTROLS`].
pub fn character_universe(
    corpus: &BTreeSet<char>,
    mapping: Option<&CharacterMapping>,
) -> BTreeSet<char> {
    let mapped = mapping
        .into_iter()
        .flat_map(|m| m.iter().flat_map(|(k, v)| [k, v]));
    corpus
        .iter()
        .copied()
        .chain(mapped)
        .filter(|c| is_printable(*c) || KEPT_CONTROLS.contains(c))
        .collect()
}

/// Sizes before and after subsetting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsetReport {
    pub original_size: usize,
    pub subset_size: usize,
    pub kept_characters: usize,
}

impl SubsetReport {
    /// Size reduction in percent of the original size.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        (1.0 - self.subset_size as f64 / self.original_size as f64) * 100.0
    }
}

/// Configures and runs one hb-subset pass over a font.
pub struct Subsetter {
    characters: BTreeSet<char>,
    retain_glyph_names: bool,
    keep_all_names: bool,
    notdef_outline: bool,
    drop_tables: Vec<[u8; 4]>,
}

impl Default for Subsetter {
    fn default() -> Self {
        Self::new()
    }
}

impl Subsetter {
    /// A subsetter that keeps glyph names, every name record and the
    /// `.notdef` outline, and drops [`BITMAP_TABLES_TO_DROP`].
    pub fn new() -> Self {
        Self {
            characters: BTreeSet::new(),
            retain_glyph_names: true,
            keep_all_names: true,
            notdef_outline: true,
            drop_tables: BITMAP_TABLES_TO_DROP.iter().map(|t| **t).collect(),
        }
    }

    /// Adds characters to keep.
    pub fn with_characters(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.characters.extend(chars);
        self
    }

    /// Sets whether to retain glyph names in the subset.
    pub fn retain_glyph_names(mut self, retain: bool) -> Self {
        self.retain_glyph_names = retain;
        self
    }

    /// Sets whether every name record survives, including legacy platforms
    /// and all languages. When `false`, hb-subset's defaults apply.
    pub fn keep_all_names(mut self, keep: bool) -> Self {
        self.keep_all_names = keep;
        self
    }

    /// Adds tables to drop on top of the bitmap tables.
    pub fn drop_tables(mut self, tags: impl IntoIterator<Item = [u8; 4]>) -> Self {
        self.drop_tables.extend(tags);
        self
    }

    pub fn characters(&self) -> &BTreeSet<char> {
        &self.characters
    }

    /// Subsets the font data and returns the result.
    pub fn subset(&self, data: &[u8]) -> Result<Vec<u8>> {
        if self.characters.is_empty() {
            return Err(SubsetError::EmptyCharacterSet);
        }
        let mut input = SubsetInput::new().map_err(hb_error)?;

        if self.retain_glyph_names {
            input.flags().retain_glyph_names();
        }
        if self.notdef_outline {
            input.flags().notdef_outline();
        }

        if self.keep_all_names {
            input.flags().name_legacy();
            {
                let mut name_ids = input.name_id_set();
                for id in 0..=MAX_NAME_ID {
                    name_ids.insert(id);
                }
            }
            {
                let mut languages = input.name_lang_id_set();
                for id in 0..=0xFFFF {
                    languages.insert(id);
                }
            }
        }

        {
            let mut unicode_set = input.unicode_set();
            for c in &self.characters {
                unicode_set.insert(*c);
            }
        }

        {
            let mut drop_tables = input.drop_table_tag_set();
            for table in &self.drop_tables {
                drop_tables.insert(Tag::new(table));
            }
        }

        debug!("Subsetting to {} characters", self.characters.len());
        let font = FontFace::new(Blob::from_bytes(data).map_err(hb_error)?).map_err(hb_error)?;
        let subset_font = input.subset_font(&font).map_err(hb_error)?;
        Ok(subset_font.underlying_blob().to_vec())
    }

    /// Like [`Self::subset`], also returning the size report.
    pub fn subset_with_report(&self, data: &[u8]) -> Result<(Vec<u8>, SubsetReport)> {
        let subset = self.subset(data)?;
        let report = SubsetReport {
            original_size: data.len(),
            subset_size: subset.len(),
            kept_characters: self.characters.len(),
        };
        info!(
            "Subset {} -> {} bytes ({:.1}% smaller)",
            report.original_size,
            report.subset_size,
            report.reduction_percent()
        );
        Ok((subset, report))
    }
}

fn hb_error(e: impl std::fmt::Display) -> SubsetError {
    SubsetError::HarfBuzz(e.to_string())
}
