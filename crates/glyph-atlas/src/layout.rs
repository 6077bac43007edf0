//! Atlas layout records and the text descriptor written next to the texture.

/// Where one glyph landed in the texture and how to draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphPlacement {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasLayout {
    pub glyphs: Vec<GlyphPlacement>,
    pub line_height: i32,
    pub base: i32,
    pub texture_size: u32,
}

impl AtlasLayout {
    /// The BMFont-style text descriptor, lines joined by `\n` with no
    /// trailing newline.
    pub fn descriptor(&self, face: &str, font_size: u32, texture_file: &str) -> String {
        let size = self.texture_size;
        let mut lines = Vec::with_capacity(self.glyphs.len() + 4);
        lines.push(format!(
            "info face=\"{face}\" size={font_size} bold=0 italic=0 charset=\"\" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0"
        ));
        lines.push(format!(
            "common lineHeight={} base={} scaleW={size} scaleH={size} pages=1 packed=0 alphaChnl=1 redChnl=0 greenChnl=0 blueChnl=0",
            self.line_height, self.base
        ));
        lines.push(format!("page id=0 file=\"{texture_file}\""));
        lines.push(format!("chars count={}", self.glyphs.len()));
        for g in &self.glyphs {
            lines.push(format!(
                "char id={} x={} y={} width={} height={} xoffset={} yoffset={} xadvance={} page=0 chnl=15",
                g.id, g.x, g.y, g.width, g.height, g.x_offset, g.y_offset, g.x_advance
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_format() {
        let layout = AtlasLayout {
            glyphs: vec![GlyphPlacement {
                id: 65,
                x: 0,
                y: 0,
                width: 10,
                height: 12,
                x_offset: 1,
                y_offset: 3,
                x_advance: 11,
            }],
            line_height: 20,
            base: 16,
            texture_size: 256,
        };
        let expected = [
            r#"info face="game.ttf" size=16 bold=0 italic=0 charset="" unicode=1 stretchH=100 smooth=1 aa=1 padding=0,0,0,0 spacing=1,1 outline=0"#,
            "common lineHeight=20 base=16 scaleW=256 scaleH=256 pages=1 packed=0 alphaChnl=1 redChnl=0 greenChnl=0 blueChnl=0",
            r#"page id=0 file="game.png""#,
            "chars count=1",
            "char id=65 x=0 y=0 width=10 height=12 xoffset=1 yoffset=3 xadvance=11 page=0 chnl=15",
        ]
        .join("\n");
        assert_eq!(layout.descriptor("game.ttf", 16, "game.png"), expected);
    }
}
