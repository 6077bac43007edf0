//! WOFF2 conversion with automatic problematic glyph handling.
//!
//! Compression itself is delegated to `ttf2woff2`. Before compressing, fonts
//! that map one of [`PROBLEMATIC_CODEPOINTS`] are subset without it, since
//! browsers reject those glyphs while decoding the WOFF2 stream.
//!
//! # Example
//!
//! ```no_run
//! use galfont_font_woff2::convert_to_woff2;
//!
//! let ttf_data: &[u8] = &[];
//! let woff2 = convert_to_woff2(ttf_data).unwrap();
//! ```

use anyhow::{Context, Result, anyhow, bail};
use galfont_font_ops::FontTables;
use hb_subset::{Blob, FontFace, SubsetInput, Tag};
use log::{debug, info};
use ttf2woff2::BrotliQuality;

/// Codepoints known to cause WOFF2 OTS validation errors.
///
/// U+F8FF (Apple logo) references `.notdef` as a composite component,
/// which Chrome's OTS parser rejects during WOFF2 decompression.
pub const PROBLEMATIC_CODEPOINTS: &[u32] = &[0xF8FF];

/// Signature at the start of every WOFF2 file.
pub const WOFF2_SIGNATURE: &[u8; 4] = b"wOF2";

/// Layout features retained when a font has to be subset first.
const LAYOUT_FEATURES: &[&[u8; 4]] = &[
    b"aalt", b"ccmp", b"dlig", b"fwid", b"hwid", b"jp78", b"jp83", b"jp90", b"liga", b"locl",
    b"nlck", b"pwid", b"vert", b"vjmo", b"vrt2", b"halt", b"vhal", b"kern", b"mark", b"mkmk",
    b"calt", b"rvrn", b"ss01", b"ss02", b"ss03", b"ss04", b"ss05", b"ss06", b"ss07", b"ss08",
    b"ss09", b"ss10", b"ss11", b"ss12", b"ss20", b"dnom", b"numr", b"frac", b"ordn", b"sups",
    b"subs", b"sinf", b"case", b"zero",
];

/// The problematic code points `data` maps.
pub fn problematic_codepoints(data: &[u8]) -> Result<Vec<u32>> {
    let tables = FontTables::new(data).context("Failed to parse font")?;
    let charset = tables.charset();
    Ok(PROBLEMATIC_CODEPOINTS
        .iter()
        .copied()
        .filter(|cp| charset.contains(cp))
        .collect())
}

/// Subsets font data excluding [`PROBLEMATIC_CODEPOINTS`].
///
/// Every other mapped code point survives, together with glyph names and
/// the layout features in [`LAYOUT_FEATURES`].
pub fn subset_for_woff2(data: &[u8]) -> Result<Vec<u8>> {
    let tables = FontTables::new(data).context("Failed to parse font")?;
    let kept: Vec<char> = tables
        .charset()
        .into_iter()
        .filter(|cp| !PROBLEMATIC_CODEPOINTS.contains(cp))
        .filter_map(char::from_u32)
        .collect();
    if kept.is_empty() {
        bail!("No valid codepoints found in font");
    }

    let mut input = SubsetInput::new()?;
    input.flags().retain_glyph_names();
    input.flags().notdef_outline();
    {
        let mut feature_set = input.layout_feature_tag_set();
        for tag in LAYOUT_FEATURES {
            feature_set.insert(Tag::new(*tag));
        }
    }
    {
        let mut unicode_set = input.unicode_set();
        for c in &kept {
            unicode_set.insert(*c);
        }
    }

    debug!("Subsetting to {} characters before compression", kept.len());
    let font_face = FontFace::new(Blob::from_bytes(data)?)?;
    let subset_font = input.subset_font(&font_face)?;
    Ok(subset_font.underlying_blob().to_vec())
}

/// Compresses a TrueType/OpenType font to WOFF2.
pub fn convert_to_woff2(data: &[u8]) -> Result<Vec<u8>> {
    let problematic = problematic_codepoints(data)?;
    let subset;
    let source = if problematic.is_empty() {
        data
    } else {
        info!(
            "Dropping {} problematic code point(s) before WOFF2 compression",
            problematic.len()
        );
        subset = subset_for_woff2(data)?;
        &subset[..]
    };
    ttf2woff2::encode(source, BrotliQuality::default())
        .map_err(|e| anyhow!("WOFF2 encoding failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use galfont_font_ops::testing::TestFont;

    #[test]
    fn test_problematic_codepoints() {
        assert!(PROBLEMATIC_CODEPOINTS.contains(&0xF8FF));
    }

    #[test]
    fn test_detects_mapped_problematic_codepoints() {
        let plain = TestFont::new(1000).glyph('A', 500).build();
        assert!(problematic_codepoints(&plain).unwrap().is_empty());

        let apple = TestFont::new(1000).glyph('A', 500).glyph('\u{F8FF}', 500).build();
        assert_eq!(problematic_codepoints(&apple).unwrap(), vec![0xF8FF]);
    }

    #[test]
    fn test_subset_drops_problematic_codepoints() {
        let data = TestFont::new(1000)
            .glyph('A', 500)
            .glyph('B', 500)
            .glyph('\u{F8FF}', 500)
            .build();
        let subset = subset_for_woff2(&data).unwrap();
        let charset = FontTables::new(&subset).unwrap().charset();
        assert!(charset.contains(&0x41));
        assert!(charset.contains(&0x42));
        assert!(!charset.contains(&0xF8FF));
    }

    #[test]
    fn test_subset_needs_something_to_keep() {
        let data = TestFont::new(1000).glyph('\u{F8FF}', 500).build();
        assert!(subset_for_woff2(&data).is_err());
    }

    #[test]
    fn test_output_is_woff2() {
        let data = TestFont::new(1000).glyph('A', 500).glyph('\u{F8FF}', 500).build();
        let woff2 = convert_to_woff2(&data).unwrap();
        assert_eq!(&woff2[..4], WOFF2_SIGNATURE);
    }
}
