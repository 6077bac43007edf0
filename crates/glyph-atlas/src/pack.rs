//! Shelf bin-packing into a square texture.

use crate::{AtlasError, Result};

/// Gap left between packed glyphs, in pixels.
pub const DEFAULT_PADDING: u32 = 2;

/// Fills a square texture row by row, left to right.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    texture_size: u32,
    padding: u32,
    x: u32,
    y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub fn new(texture_size: u32, padding: u32) -> Self {
        Self {
            texture_size,
            padding,
            x: 0,
            y: 0,
            row_height: 0,
        }
    }

    pub fn texture_size(&self) -> u32 {
        self.texture_size
    }

    /// Reserves a `width × height` box and returns its top-left corner.
    ///
    /// `code` only identifies the glyph in the overflow error.
    pub fn place(&mut self, code: u32, width: u32, height: u32) -> Result<(u32, u32)> {
        let overflow = || AtlasError::Overflow {
            code,
            width,
            height,
            texture_size: self.texture_size,
        };
        if width + self.padding > self.texture_size {
            return Err(overflow());
        }
        if self.x + width + self.padding > self.texture_size {
            self.x = 0;
            self.y += self.row_height + self.padding;
            self.row_height = 0;
        }
        if self.y + height + self.padding > self.texture_size {
            return Err(overflow());
        }

        let position = (self.x, self.y);
        self.x += width + self.padding;
        self.row_height = self.row_height.max(height);
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_rows_then_wraps() {
        let mut packer = ShelfPacker::new(32, 2);
        assert_eq!(packer.place(1, 10, 8).unwrap(), (0, 0));
        assert_eq!(packer.place(2, 10, 12).unwrap(), (12, 0));
        // 24 + 10 + 2 > 32
        assert_eq!(packer.place(3, 10, 5).unwrap(), (0, 14));
        assert_eq!(packer.place(4, 4, 4).unwrap(), (12, 14));
    }

    #[test]
    fn test_vertical_overflow() {
        let mut packer = ShelfPacker::new(16, 2);
        packer.place(1, 12, 10).unwrap();
        let err = packer.place(2, 12, 10).unwrap_err();
        assert!(matches!(err, AtlasError::Overflow { code: 2, .. }));
    }

    #[test]
    fn test_glyph_wider_than_texture() {
        let mut packer = ShelfPacker::new(16, 2);
        assert!(packer.place(1, 15, 1).is_err());
    }

    #[test]
    fn test_blank_glyphs_take_padding_only() {
        let mut packer = ShelfPacker::new(16, 2);
        assert_eq!(packer.place(32, 0, 0).unwrap(), (0, 0));
        assert_eq!(packer.place(33, 0, 0).unwrap(), (2, 0));
    }
}
