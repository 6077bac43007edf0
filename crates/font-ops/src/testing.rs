//! Synthetic TrueType fonts for tests.
//!
//! Every glyph is a single rectangle spanning `50..advance-50` horizontally
//! and `0..700` vertically, so expected outlines can be computed by hand.

use read_fonts::types::{
    FWord, Fixed, GlyphId, GlyphId16, LongDateTime, Tag, UfWord, Version16Dot16,
};
use write_fonts::{
    FontBuilder,
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, ComponentFlags, CompositeGlyph, Contour, GlyfLocaBuilder,
            Glyph, SimpleGlyph, Transform,
        },
        head::{Flags, Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::LocaFormat,
        maxp::Maxp,
        os2::{Os2, SelectionFlags},
        post::Post,
    },
};

use read_fonts::tables::glyf::CurvePoint;

use crate::rewrite::{NameEntry, build_name};

const CAP_HEIGHT: i16 = 700;

#[derive(Debug, Clone)]
enum TestGlyph {
    Rect { advance: u16 },
    Composite { base: char, advance: u16 },
}

/// Builder for a small glyf-flavoured font.
#[derive(Debug, Clone)]
pub struct TestFont {
    units_per_em: u16,
    family: String,
    glyphs: Vec<(char, TestGlyph)>,
    skip: Vec<Tag>,
    glyph_names: bool,
}

impl TestFont {
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            family: "Test Sans".to_string(),
            glyphs: Vec::new(),
            skip: Vec::new(),
            glyph_names: true,
        }
    }

    pub fn family(mut self, family: &str) -> Self {
        self.family = family.to_string();
        self
    }

    /// Adds a rectangle glyph mapped from `ch`.
    pub fn glyph(mut self, ch: char, advance: u16) -> Self {
        self.glyphs.push((ch, TestGlyph::Rect { advance }));
        self
    }

    /// Adds several rectangle glyphs with the same advance.
    pub fn glyphs(mut self, chars: impl IntoIterator<Item = char>, advance: u16) -> Self {
        for ch in chars {
            self.glyphs.push((ch, TestGlyph::Rect { advance }));
        }
        self
    }

    /// Adds a composite glyph mapped from `ch` whose only component is the
    /// glyph of `base`, which must already have been added.
    pub fn composite(mut self, ch: char, base: char, advance: u16) -> Self {
        self.glyphs.push((ch, TestGlyph::Composite { base, advance }));
        self
    }

    pub fn without_table(mut self, tag: &[u8; 4]) -> Self {
        self.skip.push(Tag::new(tag));
        self
    }

    /// Writes a post table without glyph names (version 3).
    pub fn without_glyph_names(mut self) -> Self {
        self.glyph_names = false;
        self
    }

    fn rect(advance: u16) -> SimpleGlyph {
        let right = advance.saturating_sub(50) as i16;
        let points = vec![
            CurvePoint::new(50, 0, true),
            CurvePoint::new(50, CAP_HEIGHT, true),
            CurvePoint::new(right, CAP_HEIGHT, true),
            CurvePoint::new(right, 0, true),
        ];
        SimpleGlyph {
            bbox: Bbox {
                x_min: 50,
                y_min: 0,
                x_max: right,
                y_max: CAP_HEIGHT,
            },
            contours: vec![Contour::from(points)],
            instructions: vec![],
        }
    }

    fn gid_of(&self, ch: char) -> Option<u16> {
        self.glyphs
            .iter()
            .position(|(c, _)| *c == ch)
            .map(|i| i as u16 + 1)
    }

    pub fn build(&self) -> Vec<u8> {
        let num_glyphs = self.glyphs.len() as u16 + 1;

        let mut glyf_builder = GlyfLocaBuilder::new();
        let mut metrics = vec![LongMetric {
            advance: self.units_per_em / 2,
            side_bearing: 0,
        }];
        glyf_builder.add_glyph(&Glyph::Empty).unwrap();

        let mut rects = Vec::new();
        for (_, glyph) in &self.glyphs {
            let (glyph, advance) = match glyph {
                TestGlyph::Rect { advance } => {
                    let simple = Self::rect(*advance);
                    rects.push(simple.bbox);
                    (Glyph::Simple(simple), *advance)
                }
                TestGlyph::Composite { base, advance } => {
                    let base_gid = self.gid_of(*base).expect("composite base must exist");
                    let bbox = Self::rect(*advance).bbox;
                    let component = Component {
                        glyph: GlyphId16::new(base_gid),
                        anchor: Anchor::Offset { x: 0, y: 0 },
                        flags: ComponentFlags::default(),
                        transform: Transform::default(),
                    };
                    (Glyph::Composite(CompositeGlyph::new(component, bbox)), *advance)
                }
            };
            glyf_builder.add_glyph(&glyph).unwrap();
            metrics.push(LongMetric {
                advance,
                side_bearing: 50,
            });
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let x_max = rects.iter().map(|b| b.x_max).max().unwrap_or(0);
        let head = Head {
            font_revision: Fixed::from_f64(1.0),
            checksum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: Flags::empty(),
            units_per_em: self.units_per_em,
            created: LongDateTime::new(0),
            modified: LongDateTime::new(0),
            x_min: 0,
            y_min: 0,
            x_max,
            y_max: CAP_HEIGHT,
            mac_style: MacStyle::empty(),
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: match loca_format {
                LocaFormat::Short => 0,
                LocaFormat::Long => 1,
            },
        };

        let ascent = (self.units_per_em as i32 * 4 / 5) as i16;
        let descent = -((self.units_per_em / 5) as i16);
        let advance_max = metrics.iter().map(|m| m.advance).max().unwrap_or(0);
        let hhea = Hhea {
            ascender: FWord::new(ascent),
            descender: FWord::new(descent),
            line_gap: FWord::new(0),
            advance_width_max: UfWord::new(advance_max),
            min_left_side_bearing: FWord::new(0),
            min_right_side_bearing: FWord::new(0),
            x_max_extent: FWord::new(x_max),
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            number_of_h_metrics: num_glyphs,
        };

        let maxp = Maxp {
            num_glyphs,
            max_points: Some(4),
            max_contours: Some(1),
            max_composite_points: Some(4),
            max_composite_contours: Some(1),
            max_zones: Some(1),
            max_twilight_points: Some(0),
            max_storage: Some(0),
            max_function_defs: Some(0),
            max_instruction_defs: Some(0),
            max_stack_elements: Some(0),
            max_size_of_instructions: Some(0),
            max_component_elements: Some(1),
            max_component_depth: Some(1),
        };

        let cmap = Cmap::from_mappings(
            self.glyphs
                .iter()
                .enumerate()
                .map(|(i, (ch, _))| (*ch, GlyphId::new(i as u32 + 1))),
        )
        .expect("valid cmap");

        let post = if self.glyph_names {
            let names: Vec<String> = std::iter::once(".notdef".to_string())
                .chain(
                    self.glyphs
                        .iter()
                        .map(|(ch, _)| format!("uni{:04X}", *ch as u32)),
                )
                .collect();
            Post::new_v2(names.iter().map(String::as_str))
        } else {
            Post {
                version: Version16Dot16::VERSION_3_0,
                italic_angle: Fixed::from_f64(0.0),
                underline_position: FWord::new(-100),
                underline_thickness: FWord::new(50),
                is_fixed_pitch: 0,
                min_mem_type42: 0,
                max_mem_type42: 0,
                min_mem_type1: 0,
                max_mem_type1: 0,
                num_glyphs: None,
                glyph_name_index: None,
                string_data: None,
            }
        };

        let postscript = self.family.replace(' ', "");
        let name = build_name(vec![
            NameEntry::windows_en(1, self.family.clone()),
            NameEntry::windows_en(2, "Regular"),
            NameEntry::windows_en(4, format!("{} Regular", self.family)),
            NameEntry::windows_en(6, format!("{postscript}-Regular")),
            NameEntry::windows_en(16, self.family.clone()),
            NameEntry::windows_en(17, "Regular"),
        ]);

        let os2 = Os2 {
            x_avg_char_width: advance_max as i16,
            us_weight_class: 400,
            us_width_class: 5,
            fs_type: 0,
            y_subscript_x_size: 650,
            y_subscript_y_size: 600,
            y_subscript_x_offset: 0,
            y_subscript_y_offset: 75,
            y_superscript_x_size: 650,
            y_superscript_y_size: 600,
            y_superscript_x_offset: 0,
            y_superscript_y_offset: 350,
            y_strikeout_size: 50,
            y_strikeout_position: 300,
            s_family_class: 0,
            panose_10: [0; 10],
            ul_unicode_range_1: 0,
            ul_unicode_range_2: 0,
            ul_unicode_range_3: 0,
            ul_unicode_range_4: 0,
            ach_vend_id: Tag::new(b"NONE"),
            fs_selection: SelectionFlags::REGULAR,
            us_first_char_index: 0x20,
            us_last_char_index: 0x7E,
            s_typo_ascender: ascent,
            s_typo_descender: descent,
            s_typo_line_gap: 0,
            us_win_ascent: ascent as u16,
            us_win_descent: descent.unsigned_abs(),
            ul_code_page_range_1: Some(0),
            ul_code_page_range_2: Some(0),
            sx_height: Some(500),
            s_cap_height: Some(CAP_HEIGHT),
            us_default_char: Some(0),
            us_break_char: Some(0x20),
            us_max_context: Some(0),
            us_lower_optical_point_size: None,
            us_upper_optical_point_size: None,
        };

        let mut builder = FontBuilder::new();
        let keep = |tag: &[u8; 4]| !self.skip.contains(&Tag::new(tag));
        if keep(b"head") {
            builder.add_table(&head).unwrap();
        }
        if keep(b"hhea") {
            builder.add_table(&hhea).unwrap();
        }
        if keep(b"hmtx") {
            builder.add_table(&Hmtx::new(metrics, vec![])).unwrap();
        }
        if keep(b"maxp") {
            builder.add_table(&maxp).unwrap();
        }
        if keep(b"cmap") {
            builder.add_table(&cmap).unwrap();
        }
        if keep(b"post") {
            builder.add_table(&post).unwrap();
        }
        if keep(b"name") {
            builder.add_table(&name).unwrap();
        }
        if keep(b"OS/2") {
            builder.add_table(&os2).unwrap();
        }
        if keep(b"glyf") {
            builder.add_table(&glyf).unwrap();
            builder.add_table(&loca).unwrap();
        }
        builder.build()
    }
}
