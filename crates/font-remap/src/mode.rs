//! What a rebuild does to the character map.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use galfont_charmap::CharacterMapping;

use crate::ScriptConverter;

/// The remapping applied by [`crate::rebuild`].
///
/// A mapping document pairs each relocated character (key) with its proxy
/// (value). `Forward` makes every proxy show the glyph of its source
/// character; `Reverse` makes every key show the glyph of its value.
pub enum RemapMode<'a> {
    Forward {
        mapping: &'a CharacterMapping,
        fallback: Option<&'a [u8]>,
    },
    Reverse {
        mapping: &'a CharacterMapping,
        fallback: Option<&'a [u8]>,
    },
    /// Only rewrite names and code-page bits.
    DisguiseOnly,
    TraditionalToSimplified(&'a dyn ScriptConverter),
    SimplifiedToTraditional(&'a dyn ScriptConverter),
}

impl fmt::Debug for RemapMode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl<'a> RemapMode<'a> {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Forward { .. } => "forward mapping",
            Self::Reverse { .. } => "reverse mapping",
            Self::DisguiseOnly => "disguise only",
            Self::TraditionalToSimplified(_) => "traditional to simplified",
            Self::SimplifiedToTraditional(_) => "simplified to traditional",
        }
    }

    /// `target → source` pairs: the target code point will show the glyph
    /// currently addressed by the source. Empty for non-mapping modes.
    pub fn alias_pairs(&self) -> BTreeMap<char, char> {
        match self {
            Self::Forward { mapping, .. } => mapping.iter().map(|(k, v)| (v, k)).collect(),
            Self::Reverse { mapping, .. } => mapping.iter().collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Characters whose glyphs may be transplanted from the fallback font.
    pub fn transplant_candidates(&self) -> BTreeSet<char> {
        match self {
            Self::Forward { mapping, .. } => mapping.sources().collect(),
            Self::Reverse { mapping, .. } => mapping.proxies().collect(),
            _ => BTreeSet::new(),
        }
    }

    pub fn fallback(&self) -> Option<&'a [u8]> {
        match self {
            Self::Forward { fallback, .. } | Self::Reverse { fallback, .. } => *fallback,
            _ => None,
        }
    }

    pub fn converter(&self) -> Option<&'a dyn ScriptConverter> {
        match self {
            Self::TraditionalToSimplified(c) | Self::SimplifiedToTraditional(c) => Some(*c),
            _ => None,
        }
    }
}
