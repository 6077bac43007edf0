use std::collections::{BTreeMap, BTreeSet};

use galfont_charmap::CharacterMapping;
use galfont_font_ops::{FontTables, testing::TestFont};
use galfont_font_remap::{RemapMode, RemapRequest, RemapWarning, rebuild};
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::PlatformId,
    types::{GlyphId, Tag},
};

fn cmap_of(data: &[u8], platform: PlatformId, encoding: u16) -> BTreeMap<u32, u32> {
    let font = FontRef::new(data).unwrap();
    let cmap = font.cmap().unwrap();
    let record = cmap
        .encoding_records()
        .iter()
        .find(|r| r.platform_id() == platform && r.encoding_id() == encoding)
        .expect("subtable present");
    record
        .subtable(cmap.offset_data())
        .unwrap()
        .iter()
        .map(|(cp, gid)| (cp, gid.to_u32()))
        .collect()
}

fn windows(data: &[u8]) -> BTreeMap<u32, u32> {
    cmap_of(data, PlatformId::Windows, 1)
}

fn names(data: &[u8]) -> BTreeMap<u16, String> {
    let font = FontRef::new(data).unwrap();
    let name = font.name().unwrap();
    name.name_record()
        .iter()
        .map(|r| {
            (
                r.name_id().to_u16(),
                r.string(name.string_data()).unwrap().chars().collect(),
            )
        })
        .collect()
}

fn mapping(pairs: &[(char, char)]) -> CharacterMapping {
    pairs.iter().copied().collect::<BTreeMap<_, _>>().into()
}

fn primary() -> Vec<u8> {
    TestFont::new(1000).glyphs(['a', 'b', 'c', 'x', 'y'], 500).build()
}

#[test]
fn test_forward_mapping_aliases_proxies() {
    let data = primary();
    let mapping = mapping(&[('a', 'x'), ('b', 'y')]);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: None,
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();

    let before = windows(&data);
    let after = windows(&out.data);
    assert_eq!(after[&('x' as u32)], before[&('a' as u32)]);
    assert_eq!(after[&('y' as u32)], before[&('b' as u32)]);
    // everything that is not a proxy keeps its glyph
    for cp in ['a', 'b', 'c'] {
        assert_eq!(after[&(cp as u32)], before[&(cp as u32)]);
    }
    assert_eq!(out.report.aliased(), 2);
    assert!(out.report.missing.is_empty());
}

#[test]
fn test_other_platforms_untouched() {
    let data = primary();
    let mapping = mapping(&[('a', 'x')]);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: None,
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();
    assert_eq!(
        cmap_of(&out.data, PlatformId::Unicode, 3),
        cmap_of(&data, PlatformId::Unicode, 3)
    );
}

#[test]
fn test_reverse_mapping_and_missing_sources() {
    let data = primary();
    let mapping = mapping(&[('a', 'c'), ('b', '한')]);
    let request = RemapRequest {
        mode: RemapMode::Reverse {
            mapping: &mapping,
            fallback: None,
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();

    let before = windows(&data);
    let after = windows(&out.data);
    assert_eq!(after[&('a' as u32)], before[&('c' as u32)]);
    assert_eq!(after[&('b' as u32)], before[&('b' as u32)]);
    assert_eq!(out.report.missing, BTreeSet::from(['한']));
    assert_eq!(out.report.missing_summary(), "한");
}

#[test]
fn test_disguise_rewrites_names_and_code_pages() {
    let data = TestFont::new(1000).family("Source Font").glyph('a', 500).build();
    let request = RemapRequest {
        mode: RemapMode::DisguiseOnly,
        family_name: "Game Font",
    };
    let out = rebuild(&data, &request).unwrap();

    let names = names(&out.data);
    assert_eq!(names.get(&1).map(String::as_str), Some("Game Font"));
    assert_eq!(names.get(&4).map(String::as_str), Some("Game Font Regular"));
    assert_eq!(names.get(&6).map(String::as_str), Some("GameFont-Regular"));
    assert_eq!(names.get(&2).map(String::as_str), Some("Regular"));
    assert!(!names.contains_key(&16));
    assert!(!names.contains_key(&17));

    let font = FontRef::new(&out.data).unwrap();
    let bits = font.os2().unwrap().ul_code_page_range_1().unwrap();
    assert_eq!(bits & 1, 1);
    assert_eq!(bits & (1 << 17), 1 << 17);
    assert_eq!(windows(&out.data), windows(&data));
}

#[test]
fn test_script_conversion_uses_snapshot() {
    let data = primary();
    let converter = |ch: char| match ch {
        'a' => 'b',
        'b' => 'c',
        other => other,
    };
    let request = RemapRequest {
        mode: RemapMode::TraditionalToSimplified(&converter),
        family_name: "Converted",
    };
    let out = rebuild(&data, &request).unwrap();

    let before = windows(&data);
    let after = windows(&out.data);
    assert_eq!(after[&('a' as u32)], before[&('b' as u32)]);
    assert_eq!(after[&('b' as u32)], before[&('c' as u32)]);
    assert_eq!(out.report.aliased(), 2);
}

#[test]
fn test_transplant_scales_fallback_glyph() {
    let data = TestFont::new(1000).glyph('a', 500).build();
    let fallback = TestFont::new(2048).glyph('한', 2048).glyph('z', 1000).build();
    let mapping = mapping(&[('한', 'x')]);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: Some(&fallback),
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();
    assert_eq!(out.report.transplanted, 1);
    assert_eq!(out.report.glyphs_added, 1);
    assert!(out.report.missing.is_empty());

    let tables = FontTables::new(&out.data).unwrap();
    assert_eq!(tables.num_glyphs(), 3);
    let new_gid = GlyphId::new(2);
    let cmap = windows(&out.data);
    assert_eq!(cmap[&('한' as u32)], 2);
    assert_eq!(cmap[&('x' as u32)], 2);

    let scale = 1000.0 / 2048.0;
    assert_eq!(
        tables.h_metric(new_gid).unwrap(),
        ((2048.0 * scale) as u16, (50.0 * scale) as i16)
    );
    assert_eq!(tables.glyph_name(new_gid).as_deref(), Some("uniD55C_fb"));

    let Some(read_fonts::tables::glyf::Glyph::Simple(simple)) = tables.glyph(new_gid).unwrap()
    else {
        panic!("expected a simple glyph");
    };
    assert_eq!(simple.y_max(), (700.0 * scale) as i16);
    assert_eq!(simple.x_max(), (1998.0 * scale) as i16);
}

#[test]
fn test_transplant_skipped_without_glyf() {
    let data = TestFont::new(1000).glyph('a', 500).build();
    let fallback = TestFont::new(1000)
        .glyph('한', 1000)
        .without_table(b"glyf")
        .build();
    let mapping = mapping(&[('한', 'x')]);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: Some(&fallback),
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();
    assert!(matches!(
        out.report.warnings.as_slice(),
        [RemapWarning::TransformSkipped(_)]
    ));
    assert_eq!(out.report.missing, BTreeSet::from(['한']));
    assert_eq!(FontTables::new(&out.data).unwrap().num_glyphs(), 2);
}

#[test]
fn test_transplant_drops_glyph_count_tables() {
    let data = TestFont::new(1000).glyph('a', 500).build();
    let fallback = TestFont::new(1000).glyph('b', 500).build();
    let mapping = mapping(&[('b', 'x')]);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: Some(&fallback),
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();
    let font = FontRef::new(&out.data).unwrap();
    assert!(font.table_data(Tag::new(b"hdmx")).is_none());
    assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
    assert_eq!(font.hhea().unwrap().number_of_h_metrics(), 3);
}

#[test]
fn test_transplant_widens_font_bbox() {
    let data = TestFont::new(1000).glyph('a', 500).build();
    let fallback = TestFont::new(1000).glyph('한', 3000).build();
    let mapping = mapping(&[('한', 'x')]);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: Some(&fallback),
        },
        family_name: "Disguised",
    };
    let before = FontRef::new(&data).unwrap().head().unwrap().x_max();
    assert!(before < 2950);

    let out = rebuild(&data, &request).unwrap();
    assert_eq!(out.report.transplanted, 1);
    let head = FontRef::new(&out.data).unwrap().head().unwrap();
    assert_eq!((head.x_min(), head.y_min()), (0, 0));
    assert_eq!((head.x_max(), head.y_max()), (2950, 700));
}

fn windows_format(data: &[u8], encoding: u16) -> u16 {
    let font = FontRef::new(data).unwrap();
    let cmap = font.cmap().unwrap();
    let record = cmap
        .encoding_records()
        .iter()
        .find(|r| r.platform_id() == PlatformId::Windows && r.encoding_id() == encoding)
        .expect("subtable present");
    record.subtable(cmap.offset_data()).unwrap().format()
}

#[test]
fn test_scattered_aliases_keep_bmp_subtable_format4() {
    let kanji: Vec<char> = (0x4E00..0x4E00 + 9000).filter_map(char::from_u32).collect();
    let hangul: Vec<char> = (0xAC00..0xAC00 + 4500).filter_map(char::from_u32).collect();
    let data = TestFont::new(1000)
        .glyphs(kanji.iter().copied(), 1000)
        .glyphs(hangul.iter().copied(), 1000)
        .build();
    assert_eq!(windows_format(&data, 1), 4);

    let pairs: Vec<(char, char)> = hangul
        .iter()
        .enumerate()
        .map(|(i, &h)| (h, kanji[2 * i]))
        .collect();
    let mapping = mapping(&pairs);
    let request = RemapRequest {
        mode: RemapMode::Forward {
            mapping: &mapping,
            fallback: None,
        },
        family_name: "Disguised",
    };
    let out = rebuild(&data, &request).unwrap();

    assert_eq!(windows_format(&out.data, 1), 4);
    let before = windows(&data);
    let after = windows(&out.data);
    for (h, k) in &pairs {
        assert_eq!(after[&(*k as u32)], before[&(*h as u32)]);
    }
    assert_eq!(after[&(kanji[1] as u32)], before[&(kanji[1] as u32)]);
    assert_eq!(out.report.aliased(), 4500);
}
