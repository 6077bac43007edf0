use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use galfont_glyph_atlas::{
    AbGlyphRasterizer, AtlasLayout, DEFAULT_PADDING, build_atlas,
    legacy::{LegacyConfig, build_legacy_atlas, legacy_characters},
};
use indexmap::IndexSet;

use crate::{
    Reporter,
    config::{
        DEFAULT_ATLAS_FONT_SIZE, DEFAULT_LEGACY_FONT_SIZE, DEFAULT_LEGACY_IMAGE_SIZE,
        DEFAULT_LEGACY_SPACING, DEFAULT_TEXTURE_SIZE, LEGACY_OUTPUT_DIR,
    },
    io::{file_name, read_input},
    reporter::Progress,
};

#[derive(Debug, Clone)]
pub struct AtlasConfig {
    pub font: PathBuf,
    /// Characters to pack; duplicates are packed once.
    pub characters: String,
    pub texture_size: u32,
    pub font_size: u32,
    /// The `.fnt` descriptor; the texture is written next to it as `.png`.
    pub output: PathBuf,
}

impl AtlasConfig {
    pub fn new(
        font: impl Into<PathBuf>,
        characters: impl Into<String>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            font: font.into(),
            characters: characters.into(),
            texture_size: DEFAULT_TEXTURE_SIZE,
            font_size: DEFAULT_ATLAS_FONT_SIZE,
            output: output.into(),
        }
    }
}

/// Packs the characters into one texture and writes it with its descriptor.
///
/// Overflow fails the task without writing anything.
pub fn generate_atlas(config: &AtlasConfig, reporter: &mut dyn Reporter) -> Result<AtlasLayout> {
    let mut progress = Progress::new(reporter);
    let data = read_input(&config.font)?;
    let chars: Vec<char> = config
        .characters
        .chars()
        .collect::<IndexSet<char>>()
        .into_iter()
        .collect();
    progress.log(format!(
        "Packing {} characters at size {} into {}x{}",
        chars.len(),
        config.font_size,
        config.texture_size,
        config.texture_size
    ));
    progress.set(5);

    let rasterizer = AbGlyphRasterizer::new(data, config.font_size)
        .with_context(|| format!("Failed to load {}", config.font.display()))?;
    let atlas = build_atlas(
        &rasterizer,
        &chars,
        config.texture_size,
        DEFAULT_PADDING,
        |index, total| progress.step(5, 85, index, total),
    )?;
    progress.set(90);

    if let Some(parent) = config.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    atlas.save(&config.output, &file_name(&config.font), config.font_size)?;
    progress.log(format!(
        "Saved {} glyphs to {}",
        atlas.layout.glyphs.len(),
        config.output.display()
    ));
    progress.finish();
    Ok(atlas.layout)
}

#[derive(Debug, Clone)]
pub struct LegacyAtlasConfig {
    pub font: PathBuf,
    /// Output goes to `{folder}/new`.
    pub folder: PathBuf,
    /// File stem of the texture and index.
    pub stem: String,
    pub font_size: u32,
    pub image_width: u32,
    pub image_height: u32,
    pub cell_width: u32,
    pub cell_height: u32,
    pub spacing_x: u32,
    pub spacing_y: u32,
    pub engine_name: String,
    pub engine_font_path: String,
}

impl LegacyAtlasConfig {
    pub fn new(
        font: impl Into<PathBuf>,
        folder: impl Into<PathBuf>,
        stem: impl Into<String>,
    ) -> Self {
        let (image_width, image_height) = DEFAULT_LEGACY_IMAGE_SIZE;
        Self {
            font: font.into(),
            folder: folder.into(),
            stem: stem.into(),
            font_size: DEFAULT_LEGACY_FONT_SIZE,
            image_width,
            image_height,
            cell_width: DEFAULT_LEGACY_FONT_SIZE,
            cell_height: DEFAULT_LEGACY_FONT_SIZE,
            spacing_x: DEFAULT_LEGACY_SPACING,
            spacing_y: DEFAULT_LEGACY_SPACING,
            engine_name: String::new(),
            engine_font_path: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LegacyAtlasOutput {
    pub texture: PathBuf,
    pub index: PathBuf,
    pub glyphs: usize,
    pub truncated: bool,
}

/// Draws ASCII and the CP932 double-byte set into a fixed grid and writes
/// the TGA texture plus its binary index.
pub fn generate_legacy_atlas(
    config: &LegacyAtlasConfig,
    reporter: &mut dyn Reporter,
) -> Result<LegacyAtlasOutput> {
    let mut progress = Progress::new(reporter);
    let data = read_input(&config.font)?;
    let out_dir = config.folder.join(LEGACY_OUTPUT_DIR);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let items = legacy_characters();
    progress.log(format!(
        "Drawing {} characters at size {} into {}x{}",
        items.len(),
        config.font_size,
        config.image_width,
        config.image_height
    ));
    progress.set(5);

    let rasterizer = AbGlyphRasterizer::new(data, config.font_size)
        .with_context(|| format!("Failed to load {}", config.font.display()))?;
    let legacy = LegacyConfig {
        image_width: config.image_width,
        image_height: config.image_height,
        cell_width: config.cell_width,
        cell_height: config.cell_height,
        spacing_x: config.spacing_x,
        spacing_y: config.spacing_y,
        engine_name: config.engine_name.clone(),
        engine_font_path: config.engine_font_path.clone(),
    };
    let atlas = build_legacy_atlas(&rasterizer, &items, &legacy, |index, total| {
        progress.step(5, 85, index, total)
    });
    if atlas.truncated {
        progress.log(format!(
            "Warning: image full after {} of {} characters",
            atlas.index.entries.len(),
            items.len()
        ));
    }
    progress.set(90);

    atlas.save(&out_dir, &config.stem)?;
    progress.log(format!("Saved index {}.txt", config.stem));
    progress.finish();

    Ok(LegacyAtlasOutput {
        texture: out_dir.join(format!("{}.tga", config.stem)),
        index: out_dir.join(format!("{}.txt", config.stem)),
        glyphs: atlas.index.entries.len(),
        truncated: atlas.truncated,
    })
}
