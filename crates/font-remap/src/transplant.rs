//! Copying glyphs a font lacks from a fallback font.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::{debug, info};
use read_fonts::types::{GlyphId, GlyphId16};
use write_fonts::tables::{glyf::Glyph, hmtx::LongMetric};

use galfont_font_ops::{
    FontTables,
    glyph::{OutlineMap, component_ids, convert_glyph, scale_coord},
};

use crate::{RemapError, Result};

/// Unit scales this close to 1 are not applied.
const SCALE_TOLERANCE: f64 = 0.01;

/// Glyphs to append to the primary font and the code points they serve.
#[derive(Debug, Default)]
pub(crate) struct TransplantPlan {
    pub(crate) glyphs: Vec<Glyph>,
    pub(crate) metrics: Vec<LongMetric>,
    pub(crate) names: Vec<String>,
    pub(crate) codes: BTreeMap<u32, GlyphId>,
    pub(crate) scale: Option<f64>,
    /// maxp limits of the fallback font, for merging.
    pub(crate) fallback_maxp: MaxpLimits,
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct MaxpLimits {
    pub(crate) points: u16,
    pub(crate) contours: u16,
    pub(crate) composite_points: u16,
    pub(crate) composite_contours: u16,
    pub(crate) component_elements: u16,
    pub(crate) component_depth: u16,
}

impl TransplantPlan {
    pub(crate) fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Rewrites fallback glyph ids to their new ids and scales coordinates.
struct Transplanted<'a> {
    scale: Option<f64>,
    new_ids: &'a BTreeMap<GlyphId16, GlyphId16>,
}

impl OutlineMap for Transplanted<'_> {
    fn map_point(&self, x: i16, y: i16) -> (i16, i16) {
        match self.scale {
            Some(s) => (scale_coord(x, s), scale_coord(y, s)),
            None => (x, y),
        }
    }

    fn map_component(&self, gid: GlyphId16) -> GlyphId16 {
        self.new_ids.get(&gid).copied().unwrap_or(gid)
    }
}

/// Fallback glyph ids in the order they are appended, with their new ids.
struct NewIds {
    base: usize,
    order: Vec<(GlyphId16, String)>,
    new_ids: BTreeMap<GlyphId16, GlyphId16>,
}

impl NewIds {
    fn new(base: usize) -> Self {
        Self {
            base,
            order: Vec::new(),
            new_ids: BTreeMap::new(),
        }
    }

    fn contains(&self, gid: GlyphId16) -> bool {
        self.new_ids.contains_key(&gid)
    }

    fn assign(&mut self, gid: GlyphId16, name: impl FnOnce() -> String) -> Result<GlyphId16> {
        if let Some(id) = self.new_ids.get(&gid) {
            return Ok(*id);
        }
        let next = self.base + self.order.len();
        if next >= u16::MAX as usize {
            return Err(RemapError::TooManyGlyphs(next + 1));
        }
        let id = GlyphId16::new(next as u16);
        self.new_ids.insert(gid, id);
        self.order.push((gid, name()));
        Ok(id)
    }
}

/// The unit scale from `fallback` to `primary`, or `None` when they match.
pub(crate) fn unit_scale(primary_upm: u16, fallback_upm: u16) -> Option<f64> {
    let scale = primary_upm as f64 / fallback_upm as f64;
    ((scale - 1.0).abs() > SCALE_TOLERANCE).then_some(scale)
}

/// Plans the transplant of every code point in `wanted` that `primary` does
/// not map and `fallback` does. Composite components come along and are
/// appended after the glyph that needs them.
pub(crate) fn plan(
    primary: &FontTables,
    fallback: &FontTables,
    wanted: &BTreeSet<char>,
) -> Result<TransplantPlan> {
    let primary_cmap = primary.best_cmap();
    let fallback_cmap = fallback.best_cmap();
    let scale = unit_scale(primary.units_per_em()?, fallback.units_per_em()?);
    if let Some(scale) = scale {
        info!(
            "Fallback unitsPerEm differs ({} vs {}), scaling by {scale:.2}",
            primary.units_per_em()?,
            fallback.units_per_em()?
        );
    }

    let mut ids = NewIds::new(primary.num_glyphs() as usize);
    let mut codes = BTreeMap::new();

    for ch in wanted {
        let code = *ch as u32;
        if primary_cmap.contains_key(&code) {
            continue;
        }
        let Some(fb_gid) = fallback_cmap.get(&code) else {
            continue;
        };
        let Ok(fb_gid) = GlyphId16::try_from(*fb_gid) else {
            continue;
        };
        let id = ids.assign(fb_gid, || format!("uni{code:04X}_fb"))?;
        codes.insert(code, GlyphId::from(id));

        // component closure, breadth first
        let mut queue: VecDeque<GlyphId16> = VecDeque::from([fb_gid]);
        while let Some(gid) = queue.pop_front() {
            let Some(glyph) = fallback.glyph(gid.into())? else {
                continue;
            };
            for component in component_ids(&glyph) {
                if ids.contains(component) {
                    continue;
                }
                ids.assign(component, || {
                    let name = fallback
                        .glyph_name(component.into())
                        .unwrap_or_else(|| format!("glyph{:05}", component.to_u16()));
                    format!("{name}_fb")
                })?;
                queue.push_back(component);
            }
        }
    }

    let map = Transplanted {
        scale,
        new_ids: &ids.new_ids,
    };
    let mut plan = TransplantPlan {
        scale,
        codes,
        fallback_maxp: maxp_limits(fallback),
        ..Default::default()
    };
    for (gid, name) in &ids.order {
        let (gid, name) = (*gid, name.clone());
        let glyph = fallback.glyph(gid.into())?;
        plan.glyphs.push(convert_glyph(glyph.as_ref(), &map));

        let (advance, lsb) = fallback.h_metric(gid.into())?;
        let (advance, lsb) = match scale {
            Some(s) => (
                (advance as f64 * s).trunc().clamp(0.0, u16::MAX as f64) as u16,
                scale_coord(lsb, s),
            ),
            None => (advance, lsb),
        };
        plan.metrics.push(LongMetric {
            advance,
            side_bearing: lsb,
        });
        debug!("Transplanting glyph {} as {name}", gid.to_u16());
        plan.names.push(name);
    }
    Ok(plan)
}

pub(crate) fn maxp_limits(tables: &FontTables) -> MaxpLimits {
    let Some(maxp) = tables.maxp.as_ref() else {
        return MaxpLimits::default();
    };
    MaxpLimits {
        points: maxp.max_points().unwrap_or(0),
        contours: maxp.max_contours().unwrap_or(0),
        composite_points: maxp.max_composite_points().unwrap_or(0),
        composite_contours: maxp.max_composite_contours().unwrap_or(0),
        component_elements: maxp.max_component_elements().unwrap_or(0),
        component_depth: maxp.max_component_depth().unwrap_or(0),
    }
}
