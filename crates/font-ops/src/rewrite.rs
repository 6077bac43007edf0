//! Whole-font rewriting and name table editing.

use read_fonts::{
    FontRef, TableProvider,
    types::{NameId, Tag},
};
use write_fonts::{
    FontBuilder,
    tables::name::{Name, NameRecord},
};

use crate::Result;

/// Rebuilds `data` with some tables replaced.
///
/// Every table is carried over as raw bytes first; `f` then adds the tables
/// it wants to override, which take the place of the copied ones.
pub fn rewrite_font<'a>(
    data: &'a [u8],
    f: impl FnOnce(&FontRef<'a>, &mut FontBuilder<'a>) -> Result<()>,
) -> Result<Vec<u8>> {
    rewrite_font_without(data, &[], f)
}

/// [`rewrite_font`] that also leaves out the tables in `drop`.
pub fn rewrite_font_without<'a>(
    data: &'a [u8],
    drop: &[Tag],
    f: impl FnOnce(&FontRef<'a>, &mut FontBuilder<'a>) -> Result<()>,
) -> Result<Vec<u8>> {
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();
    copy_all_tables(&font, &mut builder, drop);

    f(&font, &mut builder)?;
    Ok(builder.build())
}

/// Adds every table of `font` except those in `skip` to `builder` as raw bytes.
pub fn copy_all_tables<'a>(font: &FontRef<'a>, builder: &mut FontBuilder<'a>, skip: &[Tag]) {
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if skip.contains(&tag) {
            continue;
        }
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }
}

/// A name record to be written, independent of any parsed table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    pub value: String,
}

impl NameEntry {
    /// An English (US) record on the Windows Unicode BMP platform.
    pub fn windows_en(name_id: u16, value: impl Into<String>) -> Self {
        Self {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x409,
            name_id,
            value: value.into(),
        }
    }

    fn sort_key(&self) -> (u16, u16, u16, u16) {
        (self.platform_id, self.encoding_id, self.language_id, self.name_id)
    }
}

fn read_entries(font: &FontRef) -> Result<Vec<NameEntry>> {
    let name = font.name()?;
    let entries = name
        .name_record()
        .iter()
        .filter_map(|record| {
            let value = record.string(name.string_data()).ok()?.chars().collect::<String>();
            Some(NameEntry {
                platform_id: record.platform_id(),
                encoding_id: record.encoding_id(),
                language_id: record.language_id(),
                name_id: record.name_id().to_u16(),
                value,
            })
        })
        .collect();
    Ok(entries)
}

pub(crate) fn build_name(mut entries: Vec<NameEntry>) -> Name {
    entries.sort_by_key(NameEntry::sort_key);
    entries.dedup_by_key(|e| e.sort_key());
    Name::new(
        entries
            .into_iter()
            .map(|e| {
                NameRecord::new(
                    e.platform_id,
                    e.encoding_id,
                    e.language_id,
                    NameId::new(e.name_id),
                    e.value.into(),
                )
            })
            .collect(),
    )
}

/// Builds a name table whose strings are passed through `mapper`.
///
/// `mapper` sees each record's name id and decoded string; returning a new
/// string replaces it and `None` keeps it. Records that do not decode are
/// not carried over.
pub fn map_name_records(
    font: &FontRef,
    mut mapper: impl FnMut(u16, &str) -> Option<String>,
) -> Result<Name> {
    let entries = read_entries(font)?
        .into_iter()
        .map(|mut entry| {
            if let Some(value) = mapper(entry.name_id, &entry.value) {
                entry.value = value;
            }
            entry
        })
        .collect();
    Ok(build_name(entries))
}

/// Remove every record whose name id matches `remove`, then add `additions`.
///
/// An addition replaces an existing record with the same platform, encoding,
/// language and name id.
pub fn replace_name_records(
    font: &FontRef,
    remove: impl Fn(u16) -> bool,
    additions: Vec<NameEntry>,
) -> Result<Name> {
    let mut entries = additions;
    entries.extend(read_entries(font)?.into_iter().filter(|e| !remove(e.name_id)));
    Ok(build_name(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFont;
    use read_fonts::TableProvider;

    fn names(data: &[u8]) -> Vec<(u16, String)> {
        let font = FontRef::new(data).unwrap();
        let name = font.name().unwrap();
        name.name_record()
            .iter()
            .map(|r| {
                let s = r.string(name.string_data()).unwrap().chars().collect();
                (r.name_id().to_u16(), s)
            })
            .collect()
    }

    #[test]
    fn test_rewrite_font_keeps_tables() {
        let data = TestFont::new(1000).glyph('A', 500).build();
        let rewritten = rewrite_font(&data, |_, _| Ok(())).unwrap();

        let before = FontRef::new(&data).unwrap();
        let after = FontRef::new(&rewritten).unwrap();
        assert_eq!(
            before.table_directory.num_tables(),
            after.table_directory.num_tables()
        );
    }

    #[test]
    fn test_rewrite_font_without_drops_tables() {
        let data = TestFont::new(1000).glyph('A', 500).build();
        let rewritten = rewrite_font_without(&data, &[Tag::new(b"post")], |_, _| Ok(())).unwrap();

        let after = FontRef::new(&rewritten).unwrap();
        assert!(after.table_data(Tag::new(b"post")).is_none());
        assert!(after.table_data(Tag::new(b"glyf")).is_some());
    }

    #[test]
    fn test_map_name_records() {
        let data = TestFont::new(1000).family("Sample").glyph('A', 500).build();
        let rewritten = rewrite_font(&data, |font, builder| {
            let name = map_name_records(font, |id, current| {
                (id == 1).then(|| format!("{current} Condensed"))
            })?;
            builder.add_table(&name)?;
            Ok(())
        })
        .unwrap();

        let records = names(&rewritten);
        assert!(records.contains(&(1, "Sample Condensed".to_string())));
        assert!(records.contains(&(4, "Sample Regular".to_string())));
    }

    #[test]
    fn test_replace_name_records() {
        let data = TestFont::new(1000).family("Sample").glyph('A', 500).build();
        let rewritten = rewrite_font(&data, |font, builder| {
            let name = replace_name_records(
                font,
                |id| matches!(id, 1 | 4),
                vec![NameEntry::windows_en(1, "Other")],
            )?;
            builder.add_table(&name)?;
            Ok(())
        })
        .unwrap();

        let records = names(&rewritten);
        assert!(records.contains(&(1, "Other".to_string())));
        assert!(!records.iter().any(|(id, _)| *id == 4));
    }
}
