//! Glyph rasterization into tightly cropped coverage bitmaps.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};

use crate::{AtlasError, Result};

/// Ascent and descent in pixels at the rasterizer's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMetrics {
    pub ascent: i32,
    /// Positive distance below the baseline.
    pub descent: i32,
}

impl LineMetrics {
    pub fn line_height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// One glyph drawn with its pen at the top-left corner of a scratch canvas
/// (baseline at `ascent`) and cropped to its non-transparent pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterGlyph {
    /// Left edge of the crop on the scratch canvas.
    pub x_offset: i32,
    /// Top edge of the crop on the scratch canvas.
    pub y_offset: i32,
    pub width: u32,
    pub height: u32,
    /// Row-major coverage, `width * height` bytes.
    pub coverage: Vec<u8>,
    /// Horizontal advance in pixels.
    pub advance: f32,
}

impl RasterGlyph {
    pub fn is_blank(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Right edge of the ink, measured from the pen origin.
    pub fn right(&self) -> u32 {
        (self.x_offset.max(0) as u32) + self.width
    }

    /// Bottom edge of the ink, measured from the top of the line.
    pub fn bottom(&self) -> u32 {
        (self.y_offset.max(0) as u32) + self.height
    }

    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.coverage[(y * self.width + x) as usize]
    }
}

pub trait GlyphRasterizer {
    fn line_metrics(&self) -> LineMetrics;

    fn rasterize(&self, ch: char) -> RasterGlyph;
}

/// Rasterizer over an in-memory TrueType/OpenType font.
pub struct AbGlyphRasterizer {
    font: FontVec,
    scale: PxScale,
    /// Side of the square scratch canvas.
    canvas: u32,
}

impl AbGlyphRasterizer {
    /// A rasterizer drawing at `size` pixels per em.
    pub fn new(data: Vec<u8>, size: u32) -> Result<Self> {
        if size == 0 {
            return Err(AtlasError::InvalidSize);
        }
        let font = FontVec::try_from_vec(data)?;
        let px = size as f32;
        let scale = match font.units_per_em() {
            Some(upm) => PxScale::from(px * font.height_unscaled() / upm),
            None => PxScale::from(px),
        };
        Ok(Self {
            font,
            scale,
            canvas: size * 2,
        })
    }

    /// True when the font maps `ch` to a real glyph.
    pub fn has_glyph(&self, ch: char) -> bool {
        self.font.glyph_id(ch).0 != 0
    }
}

impl GlyphRasterizer for AbGlyphRasterizer {
    fn line_metrics(&self) -> LineMetrics {
        let scaled = self.font.as_scaled(self.scale);
        LineMetrics {
            ascent: scaled.ascent().round() as i32,
            descent: scaled.descent().abs().round() as i32,
        }
    }

    fn rasterize(&self, ch: char) -> RasterGlyph {
        let scaled = self.font.as_scaled(self.scale);
        let glyph_id = scaled.glyph_id(ch);
        let advance = scaled.h_advance(glyph_id);
        let glyph = glyph_id.with_scale_and_position(self.scale, point(0.0, scaled.ascent()));

        let Some(outlined) = self.font.outline_glyph(glyph) else {
            return RasterGlyph {
                advance,
                ..Default::default()
            };
        };

        let side = self.canvas as usize;
        let mut canvas = vec![0u8; side * side];
        let bounds = outlined.px_bounds();
        outlined.draw(|x, y, c| {
            let cx = bounds.min.x as i32 + x as i32;
            let cy = bounds.min.y as i32 + y as i32;
            if cx >= 0 && cy >= 0 && (cx as usize) < side && (cy as usize) < side {
                let value = (c.clamp(0.0, 1.0) * 255.0).round() as u8;
                let px = &mut canvas[cy as usize * side + cx as usize];
                *px = (*px).max(value);
            }
        });

        let mut glyph = crop(&canvas, self.canvas);
        glyph.advance = advance;
        glyph
    }
}

/// Crops a square coverage canvas to its non-zero pixels.
fn crop(canvas: &[u8], side: u32) -> RasterGlyph {
    let (mut x0, mut y0, mut x1, mut y1) = (side, side, 0, 0);
    for y in 0..side {
        for x in 0..side {
            if canvas[(y * side + x) as usize] > 0 {
                x0 = x0.min(x);
                y0 = y0.min(y);
                x1 = x1.max(x + 1);
                y1 = y1.max(y + 1);
            }
        }
    }
    if x1 <= x0 || y1 <= y0 {
        return RasterGlyph::default();
    }

    let (width, height) = (x1 - x0, y1 - y0);
    let mut coverage = Vec::with_capacity((width * height) as usize);
    for y in y0..y1 {
        let row = (y * side) as usize;
        coverage.extend_from_slice(&canvas[row + x0 as usize..row + x1 as usize]);
    }
    RasterGlyph {
        x_offset: x0 as i32,
        y_offset: y0 as i32,
        width,
        height,
        coverage,
        advance: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_finds_tight_bounds() {
        let mut canvas = vec![0u8; 16];
        canvas[5] = 10; // (1, 1)
        canvas[10] = 20; // (2, 2)
        let glyph = crop(&canvas, 4);
        assert_eq!((glyph.x_offset, glyph.y_offset), (1, 1));
        assert_eq!((glyph.width, glyph.height), (2, 2));
        assert_eq!(glyph.coverage, vec![10, 0, 0, 20]);
        assert_eq!(glyph.right(), 3);
        assert_eq!(glyph.bottom(), 3);
    }

    #[test]
    fn test_empty_canvas_is_blank() {
        assert!(crop(&[0u8; 9], 3).is_blank());
    }

    #[test]
    fn test_invalid_font_rejected() {
        assert!(matches!(
            AbGlyphRasterizer::new(vec![0u8; 4], 16),
            Err(AtlasError::InvalidFont(_))
        ));
        assert!(matches!(
            AbGlyphRasterizer::new(vec![], 0),
            Err(AtlasError::InvalidSize)
        ));
    }
}
