//! Geometric transforms for glyf-flavoured fonts.
//!
//! [`GeometryTransform`] scales outlines by independent horizontal and
//! vertical factors, adds a constant to every advance width and optionally
//! overwrites the vertical typographic metrics.

mod error;
mod transform;

pub use error::{GeometryError, Result};
pub use transform::{BITMAP_TABLES, GeometryTransform, TransformOutput, VerticalMetrics};
