//! cmap subtable decoding and encoding.

use std::collections::BTreeMap;

use log::debug;
use read_fonts::{
    tables::cmap as read_cmap,
    types::{GlyphId, Tag},
};
use write_fonts::tables::cmap::{Cmap, CmapSubtable, PlatformId, SequentialMapGroup};

use crate::{Error, Result};

/// Windows encoding whose subtables cover the full Unicode repertoire.
pub const WINDOWS_FULL_REPERTOIRE: u16 = 10;

/// Fixed header plus the mandatory `0xFFFF` terminating segment.
const FORMAT4_FIXED_LEN: usize = 14 + 8 + 2;

/// Largest mapping count whose glyph id array offsets always fit in 16 bits.
const MAX_GLYPH_ARRAY_MAPPINGS: usize = 32_000;

/// Reads every mapping of a subtable, dropping entries that point at `.notdef`.
pub fn subtable_mappings(subtable: &read_cmap::CmapSubtable) -> BTreeMap<u32, GlyphId> {
    subtable.iter().filter(|(_, gid)| gid.to_u32() != 0).collect()
}

/// Encodes `mappings` for a Windows subtable with the given encoding id.
///
/// The full-repertoire encoding (10) gets format 12; every other encoding
/// (symbol, BMP, legacy CJK) keeps format 4, with glyph id arrays for
/// segments whose deltas differ. Code points that format 4 cannot address
/// are left out.
pub fn encode_subtable(
    encoding_id: u16,
    mappings: &BTreeMap<u32, GlyphId>,
) -> Result<CmapSubtable> {
    let pairs = mappings
        .iter()
        .filter(|(_, gid)| gid.to_u32() != 0)
        .map(|(cp, gid)| (*cp, gid.to_u32()));
    if encoding_id == WINDOWS_FULL_REPERTOIRE {
        return Ok(CmapSubtable::format_12(0, build_groups(pairs)));
    }
    encode_format4(pairs)
}

fn encode_format4(pairs: impl Iterator<Item = (u32, u32)>) -> Result<CmapSubtable> {
    let bmp: Vec<(char, GlyphId)> = pairs
        .filter_map(|(cp, gid)| {
            let ch = char::from_u32(cp).filter(|_| cp <= 0xFFFF && gid <= u16::MAX as u32);
            if ch.is_none() {
                debug!("U+{cp:04X} left out of a format 4 subtable");
            }
            Some((ch?, GlyphId::new(gid)))
        })
        .collect();
    if bmp.is_empty() {
        return Ok(CmapSubtable::format_4(
            0,
            vec![0xFFFF],
            vec![0xFFFF],
            vec![1],
            vec![0],
            vec![],
        ));
    }
    // Past this many mappings a glyph id array could outgrow its 16-bit
    // offsets; only delta segments are safe then.
    if bmp.len() > MAX_GLYPH_ARRAY_MAPPINGS {
        return delta_format4(&bmp);
    }

    let cmap = Cmap::from_mappings(bmp)?;
    let subtable = cmap
        .encoding_records
        .into_iter()
        .find(|r| r.platform_id == PlatformId::Windows && r.encoding_id == 1)
        .map(|r| r.subtable.into_inner())
        .ok_or(Error::MissingTable(Tag::new(b"cmap")))?;
    if let CmapSubtable::Format4(f4) = &subtable {
        check_format4_len(f4.end_code.len(), f4.glyph_id_array.len())?;
    }
    Ok(subtable)
}

fn check_format4_len(segments: usize, glyph_ids: usize) -> Result<()> {
    let length = FORMAT4_FIXED_LEN + (segments - 1) * 8 + glyph_ids * 2;
    if length > u16::MAX as usize {
        return Err(Error::Format4Overflow {
            segments,
            glyph_ids,
        });
    }
    Ok(())
}

/// Format 4 built from constant-delta segments only.
fn delta_format4(bmp: &[(char, GlyphId)]) -> Result<CmapSubtable> {
    let mut end_code: Vec<u16> = Vec::new();
    let mut start_code: Vec<u16> = Vec::new();
    let mut id_delta: Vec<i16> = Vec::new();
    for &(ch, gid) in bmp {
        let cp = ch as u32 as u16;
        let delta = (gid.to_u32() as i32 - cp as i32).rem_euclid(0x10000) as u16 as i16;
        if let (Some(end), Some(last_delta)) = (end_code.last_mut(), id_delta.last())
            && *end as u32 + 1 == cp as u32
            && *last_delta == delta
        {
            *end = cp;
            continue;
        }
        end_code.push(cp);
        start_code.push(cp);
        id_delta.push(delta);
    }
    end_code.push(0xFFFF);
    start_code.push(0xFFFF);
    id_delta.push(1);
    check_format4_len(end_code.len(), 0)?;

    let id_range_offsets = vec![0u16; end_code.len()];
    Ok(CmapSubtable::format_4(
        0,
        end_code,
        start_code,
        id_delta,
        id_range_offsets,
        vec![],
    ))
}

fn build_groups(pairs: impl Iterator<Item = (u32, u32)>) -> Vec<SequentialMapGroup> {
    let mut groups: Vec<SequentialMapGroup> = Vec::new();
    for (cp, gid) in pairs {
        if let Some(last) = groups.last_mut() {
            let expected_cp = last.end_char_code + 1;
            let expected_gid = last.start_glyph_id + (expected_cp - last.start_char_code);
            if cp == expected_cp && gid == expected_gid {
                last.end_char_code = cp;
                continue;
            }
        }
        groups.push(SequentialMapGroup::new(cp, cp, gid));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use read_fonts::{FontData, FontRead};
    use write_fonts::dump_table;

    fn round_trip(subtable: &CmapSubtable) -> (u16, BTreeMap<u32, GlyphId>) {
        let bytes = dump_table(subtable).unwrap();
        let read = read_cmap::CmapSubtable::read(FontData::new(&bytes)).unwrap();
        let format = match &read {
            read_cmap::CmapSubtable::Format4(_) => 4,
            read_cmap::CmapSubtable::Format12(_) => 12,
            _ => 0,
        };
        (format, subtable_mappings(&read))
    }

    #[test]
    fn test_bmp_encoding_uses_format4() {
        let mappings = BTreeMap::from([
            (0x41, GlyphId::new(1)),
            (0x42, GlyphId::new(2)),
            (0x43, GlyphId::new(3)),
            (0x4E00, GlyphId::new(7)),
            (0x4E8C, GlyphId::new(2)),
        ]);

        let (format, decoded) = round_trip(&encode_subtable(1, &mappings).unwrap());
        assert_eq!(format, 4);
        assert_eq!(decoded, mappings);
    }

    #[test]
    fn test_full_repertoire_encoding_uses_format12() {
        let mappings = BTreeMap::from([(0x41, GlyphId::new(1)), (0x20000, GlyphId::new(2))]);

        let (format, decoded) = round_trip(&encode_subtable(10, &mappings).unwrap());
        assert_eq!(format, 12);
        assert_eq!(decoded, mappings);

        // BMP-only content still gets format 12 under encoding 10
        let bmp = BTreeMap::from([(0x41, GlyphId::new(1))]);
        assert_eq!(round_trip(&encode_subtable(10, &bmp).unwrap()).0, 12);
    }

    #[test]
    fn test_scattered_aliases_stay_format4() {
        // 9000 consecutive code points, then every other one re-pointed at
        // an unrelated glyph: delta-only segments would need thousands of them
        let mut mappings: BTreeMap<u32, GlyphId> = (0..9000u32)
            .map(|i| (0x4E00 + i, GlyphId::new(1 + i)))
            .collect();
        for i in 0..4500u32 {
            mappings.insert(0x4E00 + 2 * i, GlyphId::new(9001 + i));
        }

        let (format, decoded) = round_trip(&encode_subtable(1, &mappings).unwrap());
        assert_eq!(format, 4);
        assert_eq!(decoded, mappings);
    }

    #[test]
    fn test_format4_drops_supplementary_code_points() {
        let mappings = BTreeMap::from([(0x41, GlyphId::new(1)), (0x20000, GlyphId::new(2))]);
        let (format, decoded) = round_trip(&encode_subtable(1, &mappings).unwrap());
        assert_eq!(format, 4);
        assert_eq!(decoded, BTreeMap::from([(0x41, GlyphId::new(1))]));
    }

    #[test]
    fn test_consecutive_runs_share_group() {
        let pairs = vec![(0x41, 1), (0x42, 2), (0x43, 3), (0x45, 4)];
        let groups = build_groups(pairs.into_iter());
        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].start_char_code, groups[0].end_char_code), (0x41, 0x43));
    }

    #[test]
    fn test_notdef_mappings_are_dropped() {
        let mappings = BTreeMap::from([(0x41, GlyphId::new(0)), (0x42, GlyphId::new(5))]);
        let (_, decoded) = round_trip(&encode_subtable(1, &mappings).unwrap());
        assert_eq!(decoded, BTreeMap::from([(0x42, GlyphId::new(5))]));
    }

    #[test]
    fn test_large_regular_table_uses_delta_segments() {
        let mappings: BTreeMap<u32, GlyphId> = (0..40_000u32)
            .map(|i| (0x100 + i, GlyphId::new(1 + i)))
            .collect();
        let (format, decoded) = round_trip(&encode_subtable(1, &mappings).unwrap());
        assert_eq!(format, 4);
        assert_eq!(decoded, mappings);
    }

    #[test]
    fn test_empty_subtable_is_valid_format4() {
        let (format, decoded) = round_trip(&encode_subtable(1, &BTreeMap::new()).unwrap());
        assert_eq!(format, 4);
        assert!(decoded.is_empty());
    }
}
