//! Removal of optional tables and name records.

use log::{info, warn};
use read_fonts::{FontRef, types::Tag};

use crate::{Result, replace_name_records, rewrite_font_without};

/// Tables that only carry hinting data.
pub const HINTING_TABLES: [Tag; 6] = [
    Tag::new(b"fpgm"),
    Tag::new(b"prep"),
    Tag::new(b"cvt "),
    Tag::new(b"hdmx"),
    Tag::new(b"VDMX"),
    Tag::new(b"LTSH"),
];

/// Name ids kept by [`CleanupOptions::trim_names`]: family through
/// PostScript name.
const BASIC_NAME_IDS: std::ops::RangeInclusive<u16> = 1..=6;

#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    /// Tables to remove outright.
    pub remove: Vec<Tag>,
    /// Keep only name ids 1 to 6.
    pub trim_names: bool,
    /// Also remove every table in [`HINTING_TABLES`].
    pub strip_hinting: bool,
}

impl CleanupOptions {
    /// Parses a list of table tags where the pseudo tags `NAME_DETAILED` and
    /// `HINTING` select [`Self::trim_names`] and [`Self::strip_hinting`].
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut options = Self::default();
        for name in names {
            match name.as_ref() {
                "NAME_DETAILED" => options.trim_names = true,
                "HINTING" => options.strip_hinting = true,
                other => {
                    let mut bytes = [b' '; 4];
                    for (slot, b) in bytes.iter_mut().zip(other.bytes()) {
                        *slot = b;
                    }
                    options.remove.push(Tag::new(&bytes));
                }
            }
        }
        options
    }

    fn tags(&self) -> Vec<Tag> {
        let mut tags = self.remove.clone();
        if self.strip_hinting {
            tags.extend(HINTING_TABLES);
        }
        tags.sort();
        tags.dedup();
        tags
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Tables that were present and have been removed.
    pub removed: Vec<Tag>,
    /// Whether the name table was trimmed.
    pub names_trimmed: bool,
}

/// Removes the selected tables and name records from a font.
pub fn clean_tables(data: &[u8], options: &CleanupOptions) -> Result<(Vec<u8>, CleanupReport)> {
    let font = FontRef::new(data)?;
    let requested = options.tags();
    let removed: Vec<Tag> = requested
        .iter()
        .copied()
        .filter(|tag| font.table_data(*tag).is_some())
        .collect();

    for tag in &removed {
        info!("Removing table {tag}");
    }
    if removed.is_empty() && !options.trim_names {
        warn!("None of the selected tables are present");
    }

    let has_name = font.table_data(Tag::new(b"name")).is_some();
    let names_trimmed = options.trim_names && has_name;

    let output = rewrite_font_without(data, &removed, |font, builder| {
        if names_trimmed {
            let name = replace_name_records(font, |id| !BASIC_NAME_IDS.contains(&id), vec![])?;
            builder.add_table(&name)?;
            info!("Trimmed name table to basic records");
        }
        Ok(())
    })?;

    Ok((
        output,
        CleanupReport {
            removed,
            names_trimmed,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFont;
    use read_fonts::TableProvider;

    #[test]
    fn test_from_names_parses_pseudo_tags() {
        let options = CleanupOptions::from_names(&["GSUB", "cvt", "NAME_DETAILED", "HINTING"]);
        assert_eq!(options.remove, vec![Tag::new(b"GSUB"), Tag::new(b"cvt ")]);
        assert!(options.trim_names);
        assert!(options.strip_hinting);
    }

    #[test]
    fn test_removes_present_tables_only() {
        let data = TestFont::new(1000).glyph('A', 500).build();
        let options = CleanupOptions {
            remove: vec![Tag::new(b"post"), Tag::new(b"GPOS")],
            ..Default::default()
        };

        let (output, report) = clean_tables(&data, &options).unwrap();
        assert_eq!(report.removed, vec![Tag::new(b"post")]);

        let font = FontRef::new(&output).unwrap();
        assert!(font.table_data(Tag::new(b"post")).is_none());
        assert!(font.table_data(Tag::new(b"cmap")).is_some());
    }

    #[test]
    fn test_trim_names_keeps_basic_ids() {
        let data = TestFont::new(1000).glyph('A', 500).build();
        let options = CleanupOptions {
            trim_names: true,
            ..Default::default()
        };

        let (output, report) = clean_tables(&data, &options).unwrap();
        assert!(report.names_trimmed);

        let font = FontRef::new(&output).unwrap();
        let ids: Vec<u16> = font
            .name()
            .unwrap()
            .name_record()
            .iter()
            .map(|r| r.name_id().to_u16())
            .collect();
        assert!(ids.iter().all(|id| (1..=6).contains(id)));
        assert!(ids.contains(&1));
        assert!(!ids.contains(&16));
    }
}
