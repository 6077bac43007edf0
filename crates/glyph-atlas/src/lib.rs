//! Glyph texture atlases.
//!
//! [`build_atlas`] shelf-packs a character list into a square texture and
//! describes the result with a BMFont-style text descriptor
//! ([`AtlasLayout::descriptor`]). The [`legacy`] module produces the
//! fixed-grid TGA atlas and binary index used by older engines.

mod atlas;
mod error;
mod layout;
pub mod legacy;
mod pack;
mod raster;

pub use atlas::{Atlas, build_atlas};
pub use error::{AtlasError, Result};
pub use layout::{AtlasLayout, GlyphPlacement};
pub use pack::{DEFAULT_PADDING, ShelfPacker};
pub use raster::{AbGlyphRasterizer, GlyphRasterizer, LineMetrics, RasterGlyph};
