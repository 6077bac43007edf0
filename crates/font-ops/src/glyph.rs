//! Conversion of parsed glyf outlines into buildable ones, with an optional
//! coordinate and component mapping applied on the way.

use read_fonts::{
    tables::glyf::{self as read_glyf, CurvePoint},
    types::GlyphId16,
};
use write_fonts::tables::glyf::{
    Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, Glyph, SimpleGlyph,
    Transform,
};

/// A mapping applied to every coordinate and component reference of a glyph.
///
/// The defaults are the identity, so implementors only override what they
/// change.
pub trait OutlineMap {
    fn map_point(&self, x: i16, y: i16) -> (i16, i16) {
        (x, y)
    }

    /// Composite component offsets; defaults to [`Self::map_point`].
    fn map_offset(&self, x: i16, y: i16) -> (i16, i16) {
        self.map_point(x, y)
    }

    fn map_component(&self, gid: GlyphId16) -> GlyphId16 {
        gid
    }

    /// Bounding box of a composite glyph.
    fn map_bbox(&self, bbox: Bbox) -> Bbox {
        let (x_min, y_min) = self.map_point(bbox.x_min, bbox.y_min);
        let (x_max, y_max) = self.map_point(bbox.x_max, bbox.y_max);
        Bbox {
            x_min: x_min.min(x_max),
            y_min: y_min.min(y_max),
            x_max: x_min.max(x_max),
            y_max: y_min.max(y_max),
        }
    }
}

/// The identity mapping.
pub struct Unchanged;

impl OutlineMap for Unchanged {}

/// Truncating multiplication clamped to the `i16` range.
pub fn scale_coord(value: i16, factor: f64) -> i16 {
    (value as f64 * factor).trunc().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Converts a parsed glyph, or `None` for an empty one, into a buildable glyph.
pub fn convert_glyph(glyph: Option<&read_glyf::Glyph>, map: &impl OutlineMap) -> Glyph {
    match glyph {
        Some(read_glyf::Glyph::Simple(simple)) => convert_simple(simple, map),
        Some(read_glyf::Glyph::Composite(composite)) => convert_composite(composite, map),
        None => Glyph::Empty,
    }
}

fn convert_simple(simple: &read_glyf::SimpleGlyph, map: &impl OutlineMap) -> Glyph {
    let mut contours: Vec<Contour> = Vec::new();
    let mut points = simple.points();
    let mut current = 0usize;

    for end_pt in simple.end_pts_of_contours() {
        let end = end_pt.get() as usize;
        let mut contour_points = Vec::new();
        while current <= end {
            if let Some(pt) = points.next() {
                let (x, y) = map.map_point(pt.x, pt.y);
                contour_points.push(CurvePoint::new(x, y, pt.on_curve));
            }
            current += 1;
        }
        contours.push(Contour::from(contour_points));
    }

    let Some(bbox) = points_bbox(&contours) else {
        return Glyph::Empty;
    };

    Glyph::Simple(SimpleGlyph {
        bbox,
        contours,
        instructions: simple.instructions().to_vec(),
    })
}

fn points_bbox(contours: &[Contour]) -> Option<Bbox> {
    let mut points = contours.iter().flat_map(|c| c.iter());
    let first = points.next()?;
    let init = Bbox {
        x_min: first.x,
        y_min: first.y,
        x_max: first.x,
        y_max: first.y,
    };
    Some(points.fold(init, |b, p| Bbox {
        x_min: b.x_min.min(p.x),
        y_min: b.y_min.min(p.y),
        x_max: b.x_max.max(p.x),
        y_max: b.y_max.max(p.y),
    }))
}

fn convert_composite(composite: &read_glyf::CompositeGlyph, map: &impl OutlineMap) -> Glyph {
    let mut components: Vec<Component> = composite
        .components()
        .map(|comp| {
            let anchor = match comp.anchor {
                read_glyf::Anchor::Offset { x, y } => {
                    let (x, y) = map.map_offset(x, y);
                    Anchor::Offset { x, y }
                }
                read_glyf::Anchor::Point { base, component } => Anchor::Point { base, component },
            };
            let flags: ComponentFlags = comp.flags.into();
            Component {
                glyph: map.map_component(comp.glyph),
                anchor,
                flags,
                transform: Transform {
                    xx: comp.transform.xx,
                    yx: comp.transform.yx,
                    xy: comp.transform.xy,
                    yy: comp.transform.yy,
                },
            }
        })
        .collect();

    if components.is_empty() {
        return Glyph::Empty;
    }

    let bbox = map.map_bbox(Bbox {
        x_min: composite.x_min(),
        y_min: composite.y_min(),
        x_max: composite.x_max(),
        y_max: composite.y_max(),
    });

    let first = components.remove(0);
    let mut glyph = CompositeGlyph::new(first, bbox);
    for comp in components {
        glyph.add_component(comp, bbox);
    }
    Glyph::Composite(glyph)
}

/// Glyph ids referenced directly by a composite glyph.
pub fn component_ids(glyph: &read_glyf::Glyph) -> Vec<GlyphId16> {
    match glyph {
        read_glyf::Glyph::Composite(composite) => {
            composite.components().map(|c| c.glyph).collect()
        }
        read_glyf::Glyph::Simple(_) => Vec::new(),
    }
}
