//! What a rebuild changed, and what it could not.

use std::{collections::BTreeSet, fmt::Write};

/// How many characters of the missing list are shown to the user.
pub const MISSING_DISPLAY_LIMIT: usize = 100;

/// Aliases added to one edited cmap subtable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtableCount {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub aliased: usize,
}

/// Non-fatal conditions met while rebuilding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RemapWarning {
    #[error("fallback transplant skipped: {0}")]
    TransformSkipped(String),

    #[error("font has no Windows cmap subtable; nothing was aliased")]
    NoWindowsSubtable,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemapReport {
    pub subtables: Vec<SubtableCount>,
    /// Source characters absent from the font even after transplanting.
    pub missing: BTreeSet<char>,
    /// Code points that received a transplanted glyph.
    pub transplanted: usize,
    /// Glyphs appended to the font, including composite components.
    pub glyphs_added: usize,
    /// Unit scale applied to transplanted glyphs, if any.
    pub scale: Option<f64>,
    pub warnings: Vec<RemapWarning>,
}

impl RemapReport {
    /// The largest per-subtable alias count.
    pub fn aliased(&self) -> usize {
        self.subtables.iter().map(|s| s.aliased).max().unwrap_or(0)
    }

    /// The missing characters as one string, cut after
    /// [`MISSING_DISPLAY_LIMIT`] characters with a `... (N total)` suffix.
    pub fn missing_summary(&self) -> String {
        let mut summary: String = self.missing.iter().take(MISSING_DISPLAY_LIMIT).collect();
        if self.missing.len() > MISSING_DISPLAY_LIMIT {
            let _ = write!(summary, "... ({} total)", self.missing.len());
        }
        summary
    }
}
