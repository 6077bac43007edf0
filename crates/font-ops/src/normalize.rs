//! Conversion of cubic (CFF/CFF2) outlines to quadratic glyf/loca.

use kurbo::{BezPath, CubicBez, PathEl, Point};
use log::{debug, info};
use read_fonts::{TableProvider, types::GlyphId};
use skrifa::{
    MetadataProvider,
    instance::{LocationRef, Size},
    outline::{DrawSettings, OutlinePen},
};
use write_fonts::{
    from_obj::ToOwnedTable,
    tables::{
        glyf::{GlyfLocaBuilder, Glyph, SimpleGlyph},
        head::Head,
        maxp::Maxp,
    },
};

use crate::{CFF, CFF2, Error, FontTables, Result, rewrite_font_without};

/// Maximum distance, in font units, between a cubic and its quadratic
/// approximation.
const CUBIC_TOLERANCE: f64 = 1.0;

/// Collects skrifa draw callbacks into a path made of lines and quadratics.
#[derive(Default)]
struct QuadraticPen {
    path: BezPath,
    current: Point,
}

impl OutlinePen for QuadraticPen {
    fn move_to(&mut self, x: f32, y: f32) {
        self.current = Point::new(x as f64, y as f64);
        self.path.move_to(self.current);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.current = Point::new(x as f64, y as f64);
        self.path.line_to(self.current);
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        self.current = Point::new(x as f64, y as f64);
        self.path
            .quad_to(Point::new(cx0 as f64, cy0 as f64), self.current);
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let end = Point::new(x as f64, y as f64);
        let cubic = CubicBez::new(
            self.current,
            Point::new(cx0 as f64, cy0 as f64),
            Point::new(cx1 as f64, cy1 as f64),
            end,
        );
        for (_, _, quad) in cubic.to_quads(CUBIC_TOLERANCE) {
            self.path.quad_to(quad.p1, quad.p2);
        }
        self.current = end;
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[derive(Default)]
struct OutlineStats {
    max_points: u16,
    max_contours: u16,
}

impl OutlineStats {
    fn add(&mut self, glyph: &Glyph) {
        if let Glyph::Simple(simple) = glyph {
            let points: usize = simple.contours.iter().map(|c| c.len()).sum();
            self.max_points = self.max_points.max(points as u16);
            self.max_contours = self.max_contours.max(simple.contours.len() as u16);
        }
    }
}

fn draw_glyph(
    outlines: &skrifa::outline::OutlineGlyphCollection<'_>,
    gid: GlyphId,
) -> Result<Glyph> {
    let Some(outline) = outlines.get(gid) else {
        return Ok(Glyph::Empty);
    };
    let mut pen = QuadraticPen::default();
    outline
        .draw(
            DrawSettings::unhinted(Size::unscaled(), LocationRef::default()),
            &mut pen,
        )
        .map_err(|e| Error::Outline {
            glyph: gid.to_u32(),
            reason: e.to_string(),
        })?;

    let has_segments = pen
        .path
        .elements()
        .iter()
        .any(|el| !matches!(el, PathEl::MoveTo(_) | PathEl::ClosePath));
    if !has_segments {
        return Ok(Glyph::Empty);
    }
    let simple = SimpleGlyph::from_bezpath(&pen.path).map_err(|e| Error::Outline {
        glyph: gid.to_u32(),
        reason: format!("{e:?}"),
    })?;
    Ok(Glyph::Simple(simple))
}

/// Converts a CFF or CFF2 flavoured font to glyf/loca.
///
/// Fonts that already carry glyf outlines are returned unchanged. The CFF,
/// CFF2 and VORG tables are dropped; maxp is regenerated as version 1.0 and
/// head's loca format is updated.
pub fn normalize_to_quadratic(data: &[u8]) -> Result<Vec<u8>> {
    let tables = FontTables::new(data)?;
    if !tables.has_cff() {
        debug!("Font already uses quadratic outlines");
        return Ok(data.to_vec());
    }

    let font = skrifa::FontRef::new(data)?;
    let outlines = font.outline_glyphs();
    let num_glyphs = tables.num_glyphs();

    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut stats = OutlineStats::default();
    for gid in 0..num_glyphs {
        let glyph = draw_glyph(&outlines, GlyphId::new(gid as u32))?;
        stats.add(&glyph);
        glyf_builder.add_glyph(&glyph)?;
    }
    let (glyf, loca, loca_format) = glyf_builder.build();

    let drop = [CFF, CFF2, read_fonts::types::Tag::new(b"VORG")];
    let output = rewrite_font_without(data, &drop, |font, builder| {
        builder.add_table(&glyf)?;
        builder.add_table(&loca)?;

        let mut head: Head = font.head()?.to_owned_table();
        head.index_to_loc_format = loca_format as i16;
        builder.add_table(&head)?;

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(stats.max_points),
            max_contours: Some(stats.max_contours),
            max_composite_points: Some(0),
            max_composite_contours: Some(0),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(0),
            max_component_depth: Some(0),
        };
        builder.add_table(&maxp)?;
        Ok(())
    })?;

    info!("Converted {num_glyphs} cubic outlines to quadratic");
    Ok(output)
}
