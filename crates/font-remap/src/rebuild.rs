//! The rebuild pipeline: transplant, cmap surgery, metadata.

use log::{info, warn};
use read_fonts::{
    FontRef, TableProvider,
    types::{GlyphId, Tag},
};
use write_fonts::{
    FontBuilder,
    from_obj::ToOwnedTable,
    tables::{
        glyf::{Bbox, GlyfLocaBuilder},
        head::Head,
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        maxp::Maxp,
        post::Post,
    },
};

use galfont_font_ops::{
    FontTables,
    glyph::{Unchanged, convert_glyph},
    rewrite_font_without,
};

use crate::{
    RemapMode, Result,
    cmap_edit::CmapEdit,
    metadata::{disguise_names, disguise_os2},
    report::{RemapReport, RemapWarning},
    transplant::{self, TransplantPlan},
};

/// Tables whose layout depends on the glyph count and which go stale once
/// glyphs are appended.
const GLYPH_COUNT_TABLES: [Tag; 2] = [Tag::new(b"hdmx"), Tag::new(b"LTSH")];

#[derive(Debug)]
pub struct RemapRequest<'a> {
    pub mode: RemapMode<'a>,
    /// Family name written to the name table.
    pub family_name: &'a str,
}

#[derive(Debug, Clone)]
pub struct RemapOutput {
    pub data: Vec<u8>,
    pub report: RemapReport,
}

/// Rebuilds a glyf-flavoured font according to `request`.
///
/// Glyphs are transplanted from the fallback font first, so the aliasing
/// that follows sees them like any other glyph. Only Windows-platform cmap
/// subtables are edited.
pub fn rebuild(data: &[u8], request: &RemapRequest) -> Result<RemapOutput> {
    let primary = FontTables::new(data)?;
    let mode = &request.mode;
    let mut report = RemapReport::default();
    info!("Rebuilding font ({})", mode.describe());

    let plan = match mode.fallback() {
        Some(fallback) => plan_transplant(&primary, fallback, mode, &mut report)?,
        None => None,
    };

    let mut cmap = CmapEdit::open(primary.font())?;
    if cmap.subtables.is_empty() && !matches!(mode, RemapMode::DisguiseOnly) {
        warn!("No Windows cmap subtable found");
        report.warnings.push(RemapWarning::NoWindowsSubtable);
    }

    if let Some(plan) = &plan {
        for subtable in &mut cmap.subtables {
            for (code, gid) in &plan.codes {
                subtable.insert(*code, *gid);
            }
        }
        report.transplanted = plan.codes.len();
        report.glyphs_added = plan.glyphs.len();
        report.scale = plan.scale;
        info!(
            "Transplanted {} characters ({} glyphs)",
            plan.codes.len(),
            plan.glyphs.len()
        );
    }

    let pairs = mode.alias_pairs();
    let converter = mode.converter();
    for subtable in &mut cmap.subtables {
        if !pairs.is_empty() {
            subtable.alias_pairs(&pairs, &mut report.missing);
        }
        if let Some(converter) = converter {
            subtable.alias_converted(converter);
        }
    }
    report.subtables = cmap.counts();
    if !report.missing.is_empty() {
        warn!("{} source characters have no glyph", report.missing.len());
    }
    let cmap = cmap.build()?;

    let drop: &[Tag] = if plan.is_some() { &GLYPH_COUNT_TABLES } else { &[] };
    let data = rewrite_font_without(data, drop, |font, builder| {
        builder.add_table(&cmap)?;
        builder.add_table(&disguise_names(font, request.family_name)?)?;
        if let Some(os2) = disguise_os2(font)? {
            builder.add_table(&os2)?;
        }
        if let Some(plan) = &plan {
            append_glyphs(&primary, plan, font, builder)?;
        }
        Ok(())
    })?;

    Ok(RemapOutput { data, report })
}

fn plan_transplant(
    primary: &FontTables,
    fallback: &[u8],
    mode: &RemapMode,
    report: &mut RemapReport,
) -> Result<Option<TransplantPlan>> {
    let fallback = match FontTables::new(fallback) {
        Ok(fallback) => fallback,
        Err(e) => {
            warn!("Cannot read fallback font: {e}");
            report
                .warnings
                .push(RemapWarning::TransformSkipped(format!("unreadable fallback font: {e}")));
            return Ok(None);
        }
    };
    if !primary.has_glyf() || !fallback.has_glyf() {
        warn!("Fallback transplant needs glyf outlines in both fonts, skipping");
        report.warnings.push(RemapWarning::TransformSkipped(
            "both fonts must use glyf outlines".to_string(),
        ));
        return Ok(None);
    }
    let plan = transplant::plan(primary, &fallback, &mode.transplant_candidates())?;
    Ok((!plan.is_empty()).then_some(plan))
}

/// Writes glyf, loca, hmtx, head, hhea, maxp and (when the font has glyph
/// names) post with the planned glyphs appended.
fn append_glyphs(
    primary: &FontTables,
    plan: &TransplantPlan,
    font: &FontRef,
    builder: &mut FontBuilder,
) -> galfont_font_ops::Result<()> {
    let mut glyf_builder = GlyfLocaBuilder::new();
    let mut metrics: Vec<LongMetric> = Vec::new();
    for gid in 0..primary.num_glyphs() {
        let gid = GlyphId::new(gid as u32);
        glyf_builder.add_glyph(&convert_glyph(primary.glyph(gid)?.as_ref(), &Unchanged))?;
        let (advance, side_bearing) = primary.h_metric(gid)?;
        metrics.push(LongMetric {
            advance,
            side_bearing,
        });
    }
    for glyph in &plan.glyphs {
        glyf_builder.add_glyph(glyph)?;
    }
    metrics.extend(plan.metrics.iter().cloned());
    let total = metrics.len() as u16;
    let advance_max = metrics.iter().map(|m| m.advance).max().unwrap_or(0);

    let (glyf, loca, loca_format) = glyf_builder.build();
    builder.add_table(&glyf)?;
    builder.add_table(&loca)?;
    builder.add_table(&Hmtx::new(metrics, Vec::new()))?;

    let mut head: Head = font.head()?.to_owned_table();
    head.index_to_loc_format = loca_format as i16;
    let font_bbox = Bbox {
        x_min: head.x_min,
        y_min: head.y_min,
        x_max: head.x_max,
        y_max: head.y_max,
    };
    let font_bbox = plan
        .glyphs
        .iter()
        .filter_map(|glyph| glyph.bbox())
        .fold(font_bbox, Bbox::union);
    head.x_min = font_bbox.x_min;
    head.y_min = font_bbox.y_min;
    head.x_max = font_bbox.x_max;
    head.y_max = font_bbox.y_max;
    builder.add_table(&head)?;

    let mut hhea: Hhea = font.hhea()?.to_owned_table();
    hhea.number_of_h_metrics = total;
    hhea.advance_width_max = advance_max.into();
    builder.add_table(&hhea)?;

    let mut maxp: Maxp = font.maxp()?.to_owned_table();
    let limits = plan.fallback_maxp;
    maxp.num_glyphs = total;
    for (field, other) in [
        (&mut maxp.max_points, limits.points),
        (&mut maxp.max_contours, limits.contours),
        (&mut maxp.max_composite_points, limits.composite_points),
        (&mut maxp.max_composite_contours, limits.composite_contours),
        (&mut maxp.max_component_elements, limits.component_elements),
        (&mut maxp.max_component_depth, limits.component_depth),
    ] {
        if let Some(value) = field {
            *value = (*value).max(other);
        }
    }
    builder.add_table(&maxp)?;

    if let Some(mut names) = primary.glyph_names() {
        names.extend(plan.names.iter().cloned());
        let old = font.post()?;
        let mut post = Post::new_v2(names.iter().map(String::as_str));
        post.italic_angle = old.italic_angle();
        post.underline_position = old.underline_position();
        post.underline_thickness = old.underline_thickness();
        post.is_fixed_pitch = old.is_fixed_pitch();
        builder.add_table(&post)?;
    }
    Ok(())
}
