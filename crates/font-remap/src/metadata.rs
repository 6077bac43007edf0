//! Naming and code-page rewrites that make a font pass as a Japanese font.

use read_fonts::{FontRef, TableProvider};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{name::Name, os2::Os2},
};

use galfont_font_ops::{NameEntry, replace_name_records};

/// ulCodePageRange1 bits for Latin 1 (bit 0) and JIS/Japan (bit 17).
pub const DISGUISE_CODE_PAGES: u32 = (1 << 0) | (1 << 17);

/// Family, full, PostScript, typographic family and subfamily.
const REPLACED_NAME_IDS: [u16; 5] = [1, 4, 6, 16, 17];

const STYLE: &str = "Regular";

/// Name records written for `family`.
pub fn disguise_name_entries(family: &str) -> Vec<NameEntry> {
    let full = format!("{family} {STYLE}");
    let postscript = format!("{family}-{STYLE}").replace(' ', "");
    vec![
        NameEntry::windows_en(1, family),
        NameEntry::windows_en(4, full),
        NameEntry::windows_en(6, postscript),
    ]
}

pub fn disguise_names(font: &FontRef, family: &str) -> galfont_font_ops::Result<Name> {
    replace_name_records(
        font,
        |id| REPLACED_NAME_IDS.contains(&id),
        disguise_name_entries(family),
    )
}

/// The OS/2 table with the disguise code-page bits set, if the font has one.
pub fn disguise_os2(font: &FontRef) -> galfont_font_ops::Result<Option<Os2>> {
    let Ok(os2) = font.os2() else {
        return Ok(None);
    };
    let mut os2: Os2 = os2.to_owned_table();
    os2.ul_code_page_range_1 = Some(os2.ul_code_page_range_1.unwrap_or(0) | DISGUISE_CODE_PAGES);
    os2.ul_code_page_range_2 = Some(os2.ul_code_page_range_2.unwrap_or(0));
    Ok(Some(os2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postscript_name_has_no_spaces() {
        let entries = disguise_name_entries("My Game Font");
        let values: Vec<&str> = entries.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["My Game Font", "My Game Font Regular", "MyGameFont-Regular"]);
        assert!(entries.iter().all(|e| e.platform_id == 3 && e.language_id == 0x409));
    }

    #[test]
    fn test_disguise_bits() {
        assert_eq!(DISGUISE_CODE_PAGES, 0x0002_0001);
    }
}
