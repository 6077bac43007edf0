//! Editing of the Windows-platform cmap subtables.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::PlatformId,
    types::{GlyphId, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::cmap::{Cmap, EncodingRecord},
};

use galfont_font_ops::{cmap::subtable_mappings, encode_subtable};

use crate::{RemapError, Result, ScriptConverter, report::SubtableCount};

/// Decoded mappings of one Windows subtable, edited in place.
#[derive(Debug, Clone)]
pub(crate) struct SubtableEdit {
    index: usize,
    encoding_id: u16,
    pub(crate) mappings: BTreeMap<u32, GlyphId>,
    pub(crate) aliased: usize,
}

impl SubtableEdit {
    /// Symbol and BMP subtables cannot address supplementary planes.
    fn accepts(&self, code: u32) -> bool {
        self.encoding_id == 10 || code <= 0xFFFF
    }

    /// Points `code` at `gid`; returns whether the subtable can hold it.
    pub(crate) fn insert(&mut self, code: u32, gid: GlyphId) -> bool {
        if !self.accepts(code) {
            debug!("U+{code:04X} does not fit subtable (3, {})", self.encoding_id);
            return false;
        }
        self.mappings.insert(code, gid);
        true
    }

    /// Makes every target show the glyph its source currently maps to.
    /// Sources without a glyph are added to `missing`.
    pub(crate) fn alias_pairs(
        &mut self,
        pairs: &BTreeMap<char, char>,
        missing: &mut BTreeSet<char>,
    ) {
        for (&target, &source) in pairs {
            if target == source {
                continue;
            }
            match self.mappings.get(&(source as u32)).copied() {
                Some(gid) => {
                    if self.insert(target as u32, gid) {
                        self.aliased += 1;
                    }
                }
                None => {
                    missing.insert(source);
                }
            }
        }
    }

    /// Aliases every code point to the glyph of its converted form, looking
    /// both up in the subtable as it was before this call.
    pub(crate) fn alias_converted(&mut self, converter: &dyn ScriptConverter) {
        let snapshot = self.mappings.clone();
        for &code in snapshot.keys() {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            let converted = converter.convert(ch);
            if converted == ch {
                continue;
            }
            if let Some(&gid) = snapshot.get(&(converted as u32)) {
                self.mappings.insert(code, gid);
                self.aliased += 1;
            }
        }
    }

    fn count(&self) -> SubtableCount {
        SubtableCount {
            platform_id: 3,
            encoding_id: self.encoding_id,
            aliased: self.aliased,
        }
    }
}

/// The cmap of a font with its Windows subtables opened for editing.
///
/// Subtables of other platforms are carried over untouched.
#[derive(Debug)]
pub(crate) struct CmapEdit {
    owned: Cmap,
    pub(crate) subtables: Vec<SubtableEdit>,
}

impl CmapEdit {
    pub(crate) fn open(font: &FontRef) -> Result<Self> {
        let cmap = font
            .cmap()
            .map_err(|_| RemapError::MissingTable(Tag::new(b"cmap")))?;
        let mut subtables = Vec::new();
        for (index, record) in cmap.encoding_records().iter().enumerate() {
            if record.platform_id() != PlatformId::Windows {
                continue;
            }
            let subtable = record.subtable(cmap.offset_data())?;
            subtables.push(SubtableEdit {
                index,
                encoding_id: record.encoding_id(),
                mappings: subtable_mappings(&subtable),
                aliased: 0,
            });
        }
        Ok(Self {
            owned: cmap.to_owned_table(),
            subtables,
        })
    }

    pub(crate) fn counts(&self) -> Vec<SubtableCount> {
        self.subtables.iter().map(SubtableEdit::count).collect()
    }

    /// Re-encodes the edited subtables and assembles the new table.
    ///
    /// Each subtable keeps the format its encoding record calls for:
    /// format 12 under (3, 10), format 4 everywhere else.
    pub(crate) fn build(self) -> Result<Cmap> {
        let mut records: Vec<EncodingRecord> = self.owned.encoding_records;
        for edit in &self.subtables {
            if let Some(record) = records.get_mut(edit.index) {
                *record = EncodingRecord::new(
                    record.platform_id,
                    record.encoding_id,
                    encode_subtable(record.encoding_id, &edit.mappings)?,
                );
            }
        }
        Ok(Cmap::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(encoding_id: u16, entries: &[(char, u32)]) -> SubtableEdit {
        SubtableEdit {
            index: 0,
            encoding_id,
            mappings: entries
                .iter()
                .map(|(c, g)| (*c as u32, GlyphId::new(*g)))
                .collect(),
            aliased: 0,
        }
    }

    #[test]
    fn test_alias_pairs_records_missing_sources() {
        let mut sub = edit(1, &[('a', 1), ('b', 2)]);
        let pairs = BTreeMap::from([('x', 'a'), ('y', 'z'), ('b', 'b')]);
        let mut missing = BTreeSet::new();
        sub.alias_pairs(&pairs, &mut missing);

        assert_eq!(sub.mappings.get(&('x' as u32)), Some(&GlyphId::new(1)));
        assert_eq!(sub.aliased, 1);
        assert_eq!(missing, BTreeSet::from(['z']));
    }

    #[test]
    fn test_conversion_reads_snapshot() {
        // 'a' converts to 'b' and 'b' to 'c'; 'a' must take b's original glyph
        let mut sub = edit(1, &[('a', 1), ('b', 2), ('c', 3)]);
        let converter = |ch: char| match ch {
            'a' => 'b',
            'b' => 'c',
            other => other,
        };
        sub.alias_converted(&converter);

        assert_eq!(sub.mappings.get(&('a' as u32)), Some(&GlyphId::new(2)));
        assert_eq!(sub.mappings.get(&('b' as u32)), Some(&GlyphId::new(3)));
        assert_eq!(sub.aliased, 2);
    }

    #[test]
    fn test_bmp_subtable_rejects_supplementary() {
        let mut sub = edit(1, &[('a', 1)]);
        assert!(!sub.insert(0x20000, GlyphId::new(1)));
        let mut full = edit(10, &[('a', 1)]);
        assert!(full.insert(0x20000, GlyphId::new(1)));
    }
}
