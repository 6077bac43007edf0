//! One synchronous function per operation.
//!
//! Every task takes its configuration and a [`Reporter`](crate::Reporter);
//! tasks that write fonts also take the [`History`](crate::History) that
//! protects their outputs.

mod atlas;
mod build;
mod clean;
mod coverage;
mod geometry;
mod map;
mod subset;
mod woff2;

use std::{collections::BTreeSet, path::Path};

use anyhow::{Context, Result};
use galfont_font_ops::{FontTables, normalize_to_quadratic};

use crate::{io::read_input, reporter::Progress};

pub use atlas::{
    AtlasConfig, LegacyAtlasConfig, LegacyAtlasOutput, generate_atlas, generate_legacy_atlas,
};
pub use build::{BuildConfig, BuildMode, BuildOutput, build_font};
pub use clean::{CleanConfig, CleanOutput, NormalizeConfig, clean_font, normalize_font};
pub use coverage::{FallbackScanConfig, FallbackScanOutput, fallback_scan};
pub use geometry::{FixConfig, GeometryOutput, TweakWidthConfig, fix_geometry, tweak_width};
pub use map::{MapConfig, MapOutcome, generate_mapping};
pub use subset::{SubsetConfig, SubsetOutput, subset_font};
pub use woff2::{Woff2Config, Woff2Output, convert_woff2};

/// Reads a font and converts cubic outlines to glyf when needed.
pub(crate) fn read_quadratic(path: &Path, label: &str, progress: &mut Progress) -> Result<Vec<u8>> {
    let data = read_input(path)?;
    let tables = FontTables::new(&data)
        .with_context(|| format!("Failed to parse {label}: {}", path.display()))?;
    if !tables.has_cff() {
        return Ok(data);
    }
    progress.log(format!("Converting {label} from CFF to TrueType outlines"));
    normalize_to_quadratic(&data)
        .with_context(|| format!("Failed to convert {label}: {}", path.display()))
}

/// Best-cmap characters of the font at `path`.
pub(crate) fn font_charset(path: &Path) -> Result<BTreeSet<char>> {
    let data = read_input(path)?;
    let tables =
        FontTables::new(&data).with_context(|| format!("Failed to parse: {}", path.display()))?;
    Ok(tables
        .charset()
        .into_iter()
        .filter_map(char::from_u32)
        .collect())
}
