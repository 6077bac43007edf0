//! Packing a character list into a texture plus its layout.

use std::{fs, path::Path};

use image::{Rgba, RgbaImage};
use log::{debug, info};

use crate::{
    AtlasError, AtlasLayout, GlyphPlacement, GlyphRasterizer, RasterGlyph, Result,
    pack::ShelfPacker,
};

/// A packed texture and the layout describing it.
#[derive(Debug, Clone)]
pub struct Atlas {
    pub layout: AtlasLayout,
    pub texture: RgbaImage,
}

/// Rasterizes every character, packs them with `padding` into a
/// `texture_size` square texture and composites the result.
///
/// Fails with [`AtlasError::Overflow`] as soon as a glyph does not fit; no
/// partial texture is produced.
pub fn build_atlas(
    rasterizer: &dyn GlyphRasterizer,
    chars: &[char],
    texture_size: u32,
    padding: u32,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Atlas> {
    let metrics = rasterizer.line_metrics();
    let mut packer = ShelfPacker::new(texture_size, padding);
    let mut placed: Vec<(GlyphPlacement, RasterGlyph)> = Vec::with_capacity(chars.len());

    for (index, &ch) in chars.iter().enumerate() {
        let glyph = rasterizer.rasterize(ch);
        let (x, y) = packer.place(ch as u32, glyph.width, glyph.height)?;
        let placement = GlyphPlacement {
            id: ch as u32,
            x,
            y,
            width: glyph.width,
            height: glyph.height,
            x_offset: glyph.x_offset,
            y_offset: glyph.y_offset,
            x_advance: glyph.advance.trunc() as i32,
        };
        placed.push((placement, glyph));
        on_progress(index + 1, chars.len());
    }
    debug!("Packed {} glyphs", placed.len());

    let mut texture = RgbaImage::new(texture_size, texture_size);
    for (placement, glyph) in &placed {
        blit(&mut texture, glyph, placement.x, placement.y);
    }

    let layout = AtlasLayout {
        glyphs: placed.into_iter().map(|(p, _)| p).collect(),
        line_height: metrics.line_height(),
        base: metrics.ascent,
        texture_size,
    };
    Ok(Atlas { layout, texture })
}

/// Draws white pixels with the glyph's coverage as alpha.
pub(crate) fn blit(texture: &mut RgbaImage, glyph: &RasterGlyph, x: u32, y: u32) {
    for gy in 0..glyph.height {
        for gx in 0..glyph.width {
            let alpha = glyph.alpha(gx, gy);
            let (tx, ty) = (x + gx, y + gy);
            if alpha > 0 && tx < texture.width() && ty < texture.height() {
                texture.put_pixel(tx, ty, Rgba([255, 255, 255, alpha]));
            }
        }
    }
}

impl Atlas {
    /// Writes `{stem}.png` and `{stem}.fnt` next to each other.
    ///
    /// `face` is the font file name recorded in the descriptor.
    pub fn save(&self, descriptor_path: &Path, face: &str, font_size: u32) -> Result<()> {
        let texture_path = descriptor_path.with_extension("png");
        let texture_file = texture_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.texture.save(&texture_path)?;
        let descriptor = self.layout.descriptor(face, font_size, &texture_file);
        fs::write(descriptor_path, descriptor).map_err(AtlasError::io(descriptor_path))?;
        info!(
            "Wrote {} and {}",
            texture_path.display(),
            descriptor_path.display()
        );
        Ok(())
    }
}
