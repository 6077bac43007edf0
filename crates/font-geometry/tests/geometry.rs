use galfont_font_geometry::{GeometryError, GeometryTransform, VerticalMetrics};
use galfont_font_ops::{FontTables, testing::TestFont};
use read_fonts::{FontRef, TableProvider, tables::glyf::Glyph, types::GlyphId};

fn points(data: &[u8], gid: u32) -> Vec<(i16, i16)> {
    let tables = FontTables::new(data).unwrap();
    match tables.glyph(GlyphId::new(gid)).unwrap() {
        Some(Glyph::Simple(simple)) => simple.points().map(|p| (p.x, p.y)).collect(),
        Some(Glyph::Composite(_)) => panic!("glyph {gid} is a composite"),
        None => panic!("glyph {gid} is empty"),
    }
}

fn sample() -> Vec<u8> {
    TestFont::new(1000)
        .glyph('A', 500)
        .glyph('B', 600)
        .composite('C', 'A', 500)
        .build()
}

#[test]
fn test_identity_keeps_outlines_and_metrics() {
    let data = sample();
    let out = GeometryTransform::default().apply(&data).unwrap();
    assert_eq!(out.glyph_count, 4);
    assert!(out.dropped_tables.is_empty());
    assert_eq!(points(&out.data, 1), points(&data, 1));

    let before = FontTables::new(&data).unwrap();
    let after = FontTables::new(&out.data).unwrap();
    for gid in 0..4 {
        let gid = GlyphId::new(gid);
        assert_eq!(after.h_metric(gid).unwrap(), before.h_metric(gid).unwrap());
    }
}

#[test]
fn test_horizontal_scale_and_offset() {
    let data = sample();
    let out = GeometryTransform::width_only(1.5, 50).apply(&data).unwrap();

    // rectangle of 'A' spans 50..450 x 0..700
    assert_eq!(
        points(&out.data, 1),
        vec![(75, 0), (75, 700), (675, 700), (675, 0)]
    );

    let tables = FontTables::new(&out.data).unwrap();
    assert_eq!(tables.h_metric(GlyphId::new(1)).unwrap(), (800, 75));
    assert_eq!(tables.h_metric(GlyphId::new(2)).unwrap(), (950, 75));

    let font = tables.font();
    assert_eq!(font.hhea().unwrap().advance_width_max().to_u16(), 950);
    let head = font.head().unwrap();
    assert_eq!(head.x_max(), (550.0 * 1.5) as i16);
}

#[test]
fn test_composite_survives_scaling() {
    let out = GeometryTransform::new(2.0, 0.5, 0).apply(&sample()).unwrap();
    let tables = FontTables::new(&out.data).unwrap();
    let Some(Glyph::Composite(composite)) = tables.glyph(GlyphId::new(3)).unwrap() else {
        panic!("expected a composite glyph");
    };
    assert_eq!(composite.x_max(), 900);
    assert_eq!(composite.y_max(), 350);
    let component = composite.components().next().unwrap();
    assert_eq!(component.glyph.to_u32(), 1);
}

#[test]
fn test_vertical_metrics_written() {
    let vertical = VerticalMetrics {
        ascent: 900,
        descent: -300,
        line_gap: 50,
    };
    let out = GeometryTransform::default()
        .with_vertical_metrics(vertical)
        .apply(&sample())
        .unwrap();

    let tables = FontTables::new(&out.data).unwrap();
    let font = tables.font();
    let hhea = font.hhea().unwrap();
    assert_eq!(hhea.ascender().to_i16(), 900);
    assert_eq!(hhea.descender().to_i16(), -300);
    assert_eq!(hhea.line_gap().to_i16(), 50);

    let os2 = font.os2().unwrap();
    assert_eq!(os2.s_typo_ascender(), 900);
    assert_eq!(os2.us_win_ascent(), 900);
    assert_eq!(os2.us_win_descent(), 300);
}

#[test]
fn test_missing_glyf_is_reported() {
    let data = TestFont::new(1000).glyph('A', 500).without_table(b"glyf").build();
    let err = GeometryTransform::width_only(0.8, 0).apply(&data).unwrap_err();
    assert!(matches!(err, GeometryError::MissingTable(tag) if tag.to_string() == "glyf"));
}

#[test]
fn test_large_spacing_saturates_min_right_side_bearing() {
    let data = sample();
    let wide = GeometryTransform::width_only(1.0, 40_000).apply(&data).unwrap();
    let hhea = FontRef::new(&wide.data).unwrap().hhea().unwrap();
    assert_eq!(hhea.min_right_side_bearing().to_i16(), i16::MAX);

    let narrow = GeometryTransform::width_only(1.0, -40_000).apply(&data).unwrap();
    let hhea = FontRef::new(&narrow.data).unwrap().hhea().unwrap();
    assert_eq!(hhea.min_right_side_bearing().to_i16(), i16::MIN);
}
