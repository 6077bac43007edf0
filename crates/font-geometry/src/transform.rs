use log::{debug, info};
use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId, Tag},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::GlyfLocaBuilder,
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        os2::Os2,
    },
};

use galfont_font_ops::{
    FontTables, rewrite_font_without,
    glyph::{OutlineMap, convert_glyph, scale_coord},
};

use crate::{GeometryError, Result};

/// Tables whose pixel or device data no longer matches transformed outlines.
pub const BITMAP_TABLES: [Tag; 7] = [
    Tag::new(b"EBDT"),
    Tag::new(b"EBLC"),
    Tag::new(b"EBSC"),
    Tag::new(b"CBDT"),
    Tag::new(b"CBLC"),
    Tag::new(b"VDMX"),
    Tag::new(b"hdmx"),
];

/// Explicit vertical typographic metrics in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerticalMetrics {
    pub ascent: i16,
    /// Usually negative.
    pub descent: i16,
    pub line_gap: i16,
}

/// Independent horizontal/vertical scaling plus a constant advance offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryTransform {
    pub sx: f64,
    pub sy: f64,
    pub dx: i32,
    pub vertical: Option<VerticalMetrics>,
}

impl Default for GeometryTransform {
    fn default() -> Self {
        Self {
            sx: 1.0,
            sy: 1.0,
            dx: 0,
            vertical: None,
        }
    }
}

/// Result of [`GeometryTransform::apply`].
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub data: Vec<u8>,
    pub glyph_count: u16,
    pub dropped_tables: Vec<Tag>,
}

struct Scale {
    sx: f64,
    sy: f64,
}

impl OutlineMap for Scale {
    fn map_point(&self, x: i16, y: i16) -> (i16, i16) {
        (scale_coord(x, self.sx), scale_coord(y, self.sy))
    }
}

impl GeometryTransform {
    pub fn new(sx: f64, sy: f64, dx: i32) -> Self {
        Self {
            sx,
            sy,
            dx,
            vertical: None,
        }
    }

    /// Horizontal-only variant: outlines keep their height.
    pub fn width_only(sx: f64, dx: i32) -> Self {
        Self::new(sx, 1.0, dx)
    }

    pub fn with_vertical_metrics(mut self, vertical: VerticalMetrics) -> Self {
        self.vertical = Some(vertical);
        self
    }

    pub fn is_identity(&self) -> bool {
        self.sx == 1.0 && self.sy == 1.0 && self.dx == 0 && self.vertical.is_none()
    }

    /// `(advance, lsb)` after the transform: the advance is
    /// `max(0, floor(advance * sx) + dx)` and the side bearing
    /// `floor(lsb * sx)`.
    pub fn scale_metric(&self, advance: u16, lsb: i16) -> (u16, i16) {
        let advance = (advance as f64 * self.sx).floor() as i64 + self.dx as i64;
        let lsb = (lsb as f64 * self.sx).floor();
        (
            advance.clamp(0, u16::MAX as i64) as u16,
            lsb.clamp(i16::MIN as f64, i16::MAX as f64) as i16,
        )
    }

    /// A single outline coordinate after the transform (truncating).
    pub fn scale_point(&self, x: i16, y: i16) -> (i16, i16) {
        self.scale().map_point(x, y)
    }

    fn scale(&self) -> Scale {
        Scale {
            sx: self.sx,
            sy: self.sy,
        }
    }

    fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.sx) && ok(self.sy) {
            Ok(())
        } else {
            Err(GeometryError::InvalidScale {
                sx: self.sx,
                sy: self.sy,
            })
        }
    }

    /// Applies the transform to every glyph, metrics entry and font-wide
    /// extent of a glyf-flavoured font.
    pub fn apply(&self, data: &[u8]) -> Result<TransformOutput> {
        self.validate()?;
        let tables = FontTables::new(data)?;
        if !tables.has_glyf() {
            return Err(GeometryError::MissingTable(Tag::new(b"glyf")));
        }
        let hmtx = tables
            .hmtx
            .as_ref()
            .ok_or(GeometryError::MissingTable(Tag::new(b"hmtx")))?;

        let scale = self.scale();
        let num_glyphs = tables.num_glyphs();

        let mut glyf_builder = GlyfLocaBuilder::new();
        for gid in 0..num_glyphs {
            let glyph = tables.glyph(GlyphId::new(gid as u32))?;
            let converted = convert_glyph(glyph.as_ref(), &scale);
            glyf_builder
                .add_glyph(&converted)
                .map_err(galfont_font_ops::Error::from)?;
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let num_long = tables
            .hhea
            .as_ref()
            .map(|h| h.number_of_h_metrics())
            .unwrap_or(num_glyphs)
            .min(num_glyphs) as usize;
        let mut h_metrics = Vec::with_capacity(num_long);
        let mut left_side_bearings = Vec::new();
        for gid in 0..num_glyphs as usize {
            let glyph_id = GlyphId::new(gid as u32);
            let (advance, lsb) = self.scale_metric(
                hmtx.advance(glyph_id).unwrap_or(0),
                hmtx.side_bearing(glyph_id).unwrap_or(0),
            );
            if gid < num_long {
                h_metrics.push(LongMetric {
                    advance,
                    side_bearing: lsb,
                });
            } else {
                left_side_bearings.push(lsb);
            }
        }
        let advance_max = h_metrics.iter().map(|m| m.advance).max().unwrap_or(0);
        let new_hmtx = Hmtx::new(h_metrics, left_side_bearings);

        let dropped_tables: Vec<Tag> = match self.vertical {
            Some(_) => BITMAP_TABLES
                .iter()
                .copied()
                .filter(|tag| tables.has_table(*tag))
                .collect(),
            None => Vec::new(),
        };
        for tag in &dropped_tables {
            debug!("Dropping {tag}");
        }

        let data = rewrite_font_without(data, &dropped_tables, |font, builder| {
            builder.add_table(&glyf)?;
            builder.add_table(&loca)?;
            builder.add_table(&new_hmtx)?;

            let mut head: Head = font.head()?.to_owned_table();
            (head.x_min, head.y_min) = scale.map_point(head.x_min, head.y_min);
            (head.x_max, head.y_max) = scale.map_point(head.x_max, head.y_max);
            head.index_to_loc_format = loca_format as i16;
            builder.add_table(&head)?;

            self.rewrite_hhea(font, builder, advance_max)?;
            self.rewrite_os2(font, builder)?;
            Ok(())
        })?;

        info!(
            "Transformed {num_glyphs} glyphs (sx={:.3}, sy={:.3}, dx={:+})",
            self.sx, self.sy, self.dx
        );
        Ok(TransformOutput {
            data,
            glyph_count: num_glyphs,
            dropped_tables,
        })
    }

    fn rewrite_hhea(
        &self,
        font: &FontRef,
        builder: &mut write_fonts::FontBuilder,
        advance_max: u16,
    ) -> galfont_font_ops::Result<()> {
        let Ok(hhea) = font.hhea() else {
            return Ok(());
        };
        let mut hhea: Hhea = hhea.to_owned_table();
        let min_lsb = hhea.min_left_side_bearing.to_i16();
        let min_rsb = hhea.min_right_side_bearing.to_i16();
        let x_max = hhea.x_max_extent.to_i16();

        hhea.advance_width_max = advance_max.into();
        hhea.min_left_side_bearing = scale_coord(min_lsb, self.sx).into();
        let min_rsb = (scale_coord(min_rsb, self.sx) as i32).saturating_add(self.dx);
        hhea.min_right_side_bearing = saturate_i16(min_rsb).into();
        hhea.x_max_extent = scale_coord(x_max, self.sx).into();
        if let Some(v) = self.vertical {
            hhea.ascender = v.ascent.into();
            hhea.descender = v.descent.into();
            hhea.line_gap = v.line_gap.into();
        }
        builder.add_table(&hhea)?;
        Ok(())
    }

    fn rewrite_os2(
        &self,
        font: &FontRef,
        builder: &mut write_fonts::FontBuilder,
    ) -> galfont_font_ops::Result<()> {
        let Ok(os2) = font.os2() else {
            return Ok(());
        };
        let mut os2: Os2 = os2.to_owned_table();
        os2.x_avg_char_width = scale_coord(os2.x_avg_char_width, self.sx);
        if let Some(v) = self.vertical {
            os2.s_typo_ascender = v.ascent;
            os2.s_typo_descender = v.descent;
            os2.s_typo_line_gap = v.line_gap;
            os2.us_win_ascent = v.ascent.max(0) as u16;
            os2.us_win_descent = v.descent.unsigned_abs();
        }
        builder.add_table(&os2)?;
        Ok(())
    }
}

fn saturate_i16(value: i32) -> i16 {
    i16::try_from(value).unwrap_or(if value < 0 { i16::MIN } else { i16::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_formula() {
        let t = GeometryTransform::new(1.5, 1.0, 50);
        assert_eq!(t.scale_metric(500, 20), (800, 30));
        assert_eq!(t.scale_point(100, 200), (150, 200));
    }

    #[test]
    fn test_negative_side_bearing_floors() {
        let t = GeometryTransform::new(1.5, 1.0, 0);
        assert_eq!(t.scale_metric(100, -3), (150, -5));
    }

    #[test]
    fn test_advance_never_negative() {
        let t = GeometryTransform::width_only(0.5, -400);
        assert_eq!(t.scale_metric(500, 0).0, 0);
    }

    #[test]
    fn test_point_truncates_toward_zero() {
        let t = GeometryTransform::new(0.75, 0.75, 0);
        assert_eq!(t.scale_point(-3, 3), (-2, 2));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let t = GeometryTransform::new(0.0, 1.0, 0);
        assert!(matches!(t.validate(), Err(GeometryError::InvalidScale { .. })));
    }

    #[test]
    fn test_saturate_i16() {
        assert_eq!(saturate_i16(40_000), i16::MAX);
        assert_eq!(saturate_i16(-40_000), i16::MIN);
        assert_eq!(saturate_i16(-7), -7);
    }
}
