//! Typed, validated access to the tables of a parsed font.

use std::collections::{BTreeMap, BTreeSet};

use read_fonts::{
    FontRef, TableProvider,
    tables::{
        cmap::{Cmap, PlatformId},
        glyf::{Glyf, Glyph},
        head::Head,
        hhea::Hhea,
        hmtx::Hmtx,
        loca::Loca,
        maxp::Maxp,
        name::Name,
        os2::Os2,
        post::Post,
    },
    types::{GlyphId, GlyphId16, Tag},
};

use crate::{Error, Result};

pub const CFF: Tag = Tag::new(b"CFF ");
pub const CFF2: Tag = Tag::new(b"CFF2");

/// Preference order used to pick the cmap subtable that describes the
/// font's character set: full-repertoire Unicode first, then BMP-only.
const BEST_CMAP_ORDER: [(PlatformId, u16); 8] = [
    (PlatformId::Windows, 10),
    (PlatformId::Unicode, 6),
    (PlatformId::Unicode, 4),
    (PlatformId::Windows, 1),
    (PlatformId::Unicode, 3),
    (PlatformId::Unicode, 2),
    (PlatformId::Unicode, 1),
    (PlatformId::Unicode, 0),
];

/// A parsed font with one optional field per table this workspace touches.
///
/// Tables are resolved once on construction. Operations that need a table
/// call the matching `require_*` accessor, which fails with
/// [`Error::MissingTable`] instead of probing the font again.
pub struct FontTables<'a> {
    data: &'a [u8],
    font: FontRef<'a>,
    pub cmap: Option<Cmap<'a>>,
    pub glyf: Option<Glyf<'a>>,
    pub loca: Option<Loca<'a>>,
    pub hmtx: Option<Hmtx<'a>>,
    pub head: Option<Head<'a>>,
    pub hhea: Option<Hhea<'a>>,
    pub maxp: Option<Maxp<'a>>,
    pub os2: Option<Os2<'a>>,
    pub name: Option<Name<'a>>,
    pub post: Option<Post<'a>>,
}

impl std::fmt::Debug for FontTables<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontTables")
            .field("data_len", &self.data.len())
            .field("glyf", &self.glyf.is_some())
            .field("cff", &self.has_cff())
            .finish_non_exhaustive()
    }
}

impl<'a> FontTables<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let font = FontRef::new(data)?;
        Ok(Self {
            data,
            cmap: font.cmap().ok(),
            glyf: font.glyf().ok(),
            loca: font.loca(None).ok(),
            hmtx: font.hmtx().ok(),
            head: font.head().ok(),
            hhea: font.hhea().ok(),
            maxp: font.maxp().ok(),
            os2: font.os2().ok(),
            name: font.name().ok(),
            post: font.post().ok(),
            font,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn has_table(&self, tag: Tag) -> bool {
        self.font.table_data(tag).is_some()
    }

    /// True when glyphs are stored as cubic CFF/CFF2 charstrings.
    pub fn has_cff(&self) -> bool {
        self.has_table(CFF) || self.has_table(CFF2)
    }

    /// True when the font carries quadratic glyf/loca outlines.
    pub fn has_glyf(&self) -> bool {
        self.glyf.is_some() && self.loca.is_some()
    }

    pub fn require_cmap(&self) -> Result<&Cmap<'a>> {
        self.cmap.as_ref().ok_or(Error::MissingTable(Tag::new(b"cmap")))
    }

    pub fn require_glyf(&self) -> Result<(&Glyf<'a>, &Loca<'a>)> {
        let glyf = self.glyf.as_ref().ok_or(Error::MissingTable(Tag::new(b"glyf")))?;
        let loca = self.loca.as_ref().ok_or(Error::MissingTable(Tag::new(b"loca")))?;
        Ok((glyf, loca))
    }

    pub fn require_hmtx(&self) -> Result<&Hmtx<'a>> {
        self.hmtx.as_ref().ok_or(Error::MissingTable(Tag::new(b"hmtx")))
    }

    pub fn require_head(&self) -> Result<&Head<'a>> {
        self.head.as_ref().ok_or(Error::MissingTable(Tag::new(b"head")))
    }

    pub fn require_hhea(&self) -> Result<&Hhea<'a>> {
        self.hhea.as_ref().ok_or(Error::MissingTable(Tag::new(b"hhea")))
    }

    pub fn require_maxp(&self) -> Result<&Maxp<'a>> {
        self.maxp.as_ref().ok_or(Error::MissingTable(Tag::new(b"maxp")))
    }

    pub fn require_name(&self) -> Result<&Name<'a>> {
        self.name.as_ref().ok_or(Error::MissingTable(Tag::new(b"name")))
    }

    pub fn num_glyphs(&self) -> u16 {
        self.maxp.as_ref().map(|m| m.num_glyphs()).unwrap_or(0)
    }

    pub fn units_per_em(&self) -> Result<u16> {
        Ok(self.require_head()?.units_per_em())
    }

    /// Outline of one glyph; `None` for empty glyphs.
    pub fn glyph(&self, gid: GlyphId) -> Result<Option<Glyph<'a>>> {
        let (glyf, loca) = self.require_glyf()?;
        Ok(loca.get_glyf(gid, glyf)?)
    }

    /// `(advance, left side bearing)` for a glyph.
    pub fn h_metric(&self, gid: GlyphId) -> Result<(u16, i16)> {
        let hmtx = self.require_hmtx()?;
        Ok((hmtx.advance(gid).unwrap_or(0), hmtx.side_bearing(gid).unwrap_or(0)))
    }

    pub fn glyph_name(&self, gid: GlyphId) -> Option<String> {
        let gid = GlyphId16::try_from(gid).ok()?;
        self.post
            .as_ref()
            .and_then(|post| post.glyph_name(gid))
            .map(|name| name.to_string())
    }

    /// All glyph names when the post table carries them.
    pub fn glyph_names(&self) -> Option<Vec<String>> {
        let post = self.post.as_ref()?;
        (0..self.num_glyphs())
            .map(|gid| post.glyph_name(GlyphId16::new(gid)).map(|n| n.to_string()))
            .collect()
    }

    /// Code point → glyph mapping of the preferred Unicode subtable.
    pub fn best_cmap(&self) -> BTreeMap<u32, GlyphId> {
        let Some(cmap) = self.cmap.as_ref() else {
            return BTreeMap::new();
        };
        let records = cmap.encoding_records();

        let best = BEST_CMAP_ORDER.iter().find_map(|(platform, encoding)| {
            records
                .iter()
                .filter(|r| r.platform_id() == *platform && r.encoding_id() == *encoding)
                .find_map(|r| r.subtable(cmap.offset_data()).ok())
        });

        best.map(|subtable| subtable.iter().filter(|(_, gid)| gid.to_u32() != 0).collect())
            .unwrap_or_default()
    }

    /// Code points covered by [`Self::best_cmap`].
    pub fn charset(&self) -> BTreeSet<u32> {
        self.best_cmap().into_keys().collect()
    }
}
