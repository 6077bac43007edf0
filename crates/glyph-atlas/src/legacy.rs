//! Fixed-grid atlas and binary index for legacy engines that address glyphs
//! by CP932 code.

use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::RangeInclusive,
    path::Path,
};

use byteorder::{LittleEndian, WriteBytesExt};
use galfont_charmap::CodePage;
use image::RgbaImage;
use log::{info, warn};

use crate::{AtlasError, GlyphRasterizer, Result, atlas::blit};

const LEAD_BYTES: [RangeInclusive<u8>; 3] = [0x81..=0x9F, 0xE0..=0xEA, 0xFA..=0xFC];
const TRAIL_BYTES: RangeInclusive<u8> = 0x40..=0xFF;

/// Flag byte written to every index record.
pub const RECORD_FLAG: u8 = 0x1E;
pub const RECORD_COLOR_MASK: u32 = 0xFFFF_FFFF;
/// Size of one glyph record in the index.
pub const RECORD_SIZE: usize = 28;

/// Printable ASCII, then every CP932 double-byte code that decodes to a
/// single character, paired with the code the engine looks up.
pub fn legacy_characters() -> Vec<(char, u16)> {
    let mut items: Vec<(char, u16)> = (0x20u8..0x7F).map(|b| (b as char, b as u16)).collect();
    for lead in LEAD_BYTES.iter().flat_map(|r| r.clone()) {
        for trail in TRAIL_BYTES {
            if let Some(ch) = CodePage::Cp932.decode_single(&[lead, trail]) {
                items.push((ch, u16::from_be_bytes([lead, trail])));
            }
        }
    }
    items
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyConfig {
    pub image_width: u32,
    pub image_height: u32,
    /// Cell size recorded in the index header; the row pitch uses the height.
    pub cell_width: u32,
    pub cell_height: u32,
    pub spacing_x: u32,
    pub spacing_y: u32,
    pub engine_name: String,
    /// Font path as the engine expects it, written into the index.
    pub engine_font_path: String,
}

/// One glyph box of the grid, `x1`/`y1` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub code: u16,
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyIndex {
    pub engine_name: String,
    pub cell_width: u32,
    pub cell_height: u32,
    pub font_path: String,
    pub entries: Vec<IndexEntry>,
}

impl LegacyIndex {
    /// Serializes the index, little-endian, strings as CP932 with a `u32`
    /// length prefix.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let io = |e: std::io::Error| AtlasError::Io {
            path: Default::default(),
            source: e,
        };
        let encode = |s: &str| {
            CodePage::Cp932
                .encode_text(s)
                .ok_or_else(|| AtlasError::Encoding(s.to_string()))
        };
        let name = encode(&self.engine_name)?;
        let path = encode(&self.font_path)?;

        out.write_u32::<LittleEndian>(name.len() as u32).map_err(io)?;
        out.write_all(&name).map_err(io)?;
        out.write_u32::<LittleEndian>(self.cell_width).map_err(io)?;
        out.write_u32::<LittleEndian>(self.cell_height).map_err(io)?;
        out.write_u32::<LittleEndian>(path.len() as u32).map_err(io)?;
        out.write_all(&path).map_err(io)?;
        out.write_u32::<LittleEndian>(self.entries.len() as u32).map_err(io)?;

        for entry in &self.entries {
            let width = entry.x1.saturating_sub(entry.x0).min(u8::MAX as u32) as u8;
            out.write_u16::<LittleEndian>(entry.code).map_err(io)?;
            out.write_u8(width).map_err(io)?;
            out.write_u8(RECORD_FLAG).map_err(io)?;
            for v in [entry.x0, entry.y0, entry.x1, entry.y1, RECORD_COLOR_MASK, 0] {
                out.write_u32::<LittleEndian>(v).map_err(io)?;
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }
}

#[derive(Debug, Clone)]
pub struct LegacyAtlas {
    pub texture: RgbaImage,
    pub index: LegacyIndex,
    /// True when the image ran out of rows before every character was drawn.
    pub truncated: bool,
}

/// Draws `items` left to right in rows of pitch `cell_height + spacing_y`.
///
/// Each glyph occupies the box from the pen origin to the right and bottom
/// of its ink. Drawing stops with a warning once a new row would not fit.
pub fn build_legacy_atlas(
    rasterizer: &dyn GlyphRasterizer,
    items: &[(char, u16)],
    config: &LegacyConfig,
    mut on_progress: impl FnMut(usize, usize),
) -> LegacyAtlas {
    let mut texture = RgbaImage::new(config.image_width, config.image_height);
    let mut entries = Vec::new();
    let mut truncated = false;
    let (mut px, mut py) = (0u32, 0u32);

    for (index, &(ch, code)) in items.iter().enumerate() {
        let glyph = rasterizer.rasterize(ch);
        let (w, h) = (glyph.right(), glyph.bottom());

        if px + w > config.image_width {
            px = 0;
            py += config.cell_height + config.spacing_y;
            if py + config.cell_height > config.image_height {
                warn!("Image is full after {} glyphs, truncating", entries.len());
                truncated = true;
                break;
            }
        }

        blit(
            &mut texture,
            &glyph,
            px + glyph.x_offset.max(0) as u32,
            py + glyph.y_offset.max(0) as u32,
        );
        entries.push(IndexEntry {
            code,
            x0: px,
            y0: py,
            x1: px + w,
            y1: py + h,
        });
        px += w + config.spacing_x;

        if index % 500 == 0 {
            on_progress(index, items.len());
        }
    }

    LegacyAtlas {
        texture,
        index: LegacyIndex {
            engine_name: config.engine_name.clone(),
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            font_path: config.engine_font_path.clone(),
            entries,
        },
        truncated,
    }
}

impl LegacyAtlas {
    /// Writes `{stem}.tga` and the index as `{stem}.txt` into `dir`.
    pub fn save(&self, dir: &Path, stem: &str) -> Result<()> {
        let texture_path = dir.join(format!("{stem}.tga"));
        let index_path = dir.join(format!("{stem}.txt"));
        self.texture.save(&texture_path)?;

        let file = File::create(&index_path).map_err(AtlasError::io(&index_path))?;
        let mut out = BufWriter::new(file);
        self.index.write_to(&mut out)?;
        out.flush().map_err(AtlasError::io(&index_path))?;
        info!(
            "Wrote {} glyphs to {}",
            self.index.entries.len(),
            index_path.display()
        );
        Ok(())
    }
}
