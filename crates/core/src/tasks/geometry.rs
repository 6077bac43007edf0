use std::path::PathBuf;

use anyhow::{Context, Result};
use galfont_font_geometry::{GeometryTransform, VerticalMetrics};
use galfont_font_ops::{map_name_records, rewrite_font};
use read_fonts::types::Tag;

use crate::{
    History, Reporter,
    config::{CONDENSED_SUFFIX, MIN_VISIBLE_SPACING},
    io::{file_name, require_exists, write_protected},
    reporter::Progress,
    tasks::read_quadratic,
};

/// Scale, spacing and vertical metrics in one pass.
#[derive(Debug, Clone)]
pub struct FixConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    pub scale_x: f64,
    pub scale_y: f64,
    pub spacing: i32,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
}

/// Horizontal scale and spacing; the result is saved next to the source.
#[derive(Debug, Clone)]
pub struct TweakWidthConfig {
    pub source: PathBuf,
    pub scale: f64,
    pub spacing: i32,
    pub file_name: String,
}

#[derive(Debug, Clone)]
pub struct GeometryOutput {
    pub path: PathBuf,
    pub glyph_count: u16,
    pub dropped_tables: Vec<Tag>,
}

pub fn fix_geometry(
    config: &FixConfig,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<GeometryOutput> {
    let mut progress = Progress::new(reporter);
    require_exists(&config.source)?;
    progress.log(format!(
        "Fixing {}: width {:.2}x, height {:.2}x, spacing {:+}, ascent {}, descent {}",
        file_name(&config.source),
        config.scale_x,
        config.scale_y,
        config.spacing,
        config.ascent,
        config.descent
    ));
    progress.set(5);

    let data = read_quadratic(&config.source, "font", &mut progress)?;
    let transform = GeometryTransform::new(config.scale_x, config.scale_y, config.spacing)
        .with_vertical_metrics(VerticalMetrics {
            ascent: config.ascent,
            descent: config.descent,
            line_gap: config.line_gap,
        });
    let output = transform
        .apply(&data)
        .with_context(|| format!("Failed to transform {}", config.source.display()))?;
    progress.set(80);
    for tag in &output.dropped_tables {
        progress.log(format!("Removed {tag}"));
    }

    let description = format!("Asc {} Desc {}", config.ascent, config.descent);
    write_protected(history, "fix metrics", &config.output, &output.data, &description)?;
    progress.log(format!("Saved {}", config.output.display()));
    progress.finish();

    Ok(GeometryOutput {
        path: config.output.clone(),
        glyph_count: output.glyph_count,
        dropped_tables: output.dropped_tables,
    })
}

/// Narrows or widens every glyph and renames the family with a
/// `" Condensed"` suffix.
pub fn tweak_width(
    config: &TweakWidthConfig,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<GeometryOutput> {
    let mut progress = Progress::new(reporter);
    require_exists(&config.source)?;
    if config.scale == 1.0 && config.spacing.abs() < MIN_VISIBLE_SPACING {
        progress.log(format!(
            "Warning: a spacing of {} units is hardly visible; try values like 50, 100 or -50",
            config.spacing
        ));
    }
    progress.log(format!(
        "Scaling widths by {:.2} with spacing {:+}",
        config.scale, config.spacing
    ));
    progress.set(5);

    let data = read_quadratic(&config.source, "font", &mut progress)?;
    let output = GeometryTransform::width_only(config.scale, config.spacing)
        .apply(&data)
        .with_context(|| format!("Failed to transform {}", config.source.display()))?;
    progress.set(90);

    let renamed = rewrite_font(&output.data, |font, builder| {
        let name = map_name_records(font, |name_id, value| {
            matches!(name_id, 1 | 4).then(|| format!("{value}{CONDENSED_SUFFIX}"))
        })?;
        builder.add_table(&name)?;
        Ok(())
    })?;

    let path = config
        .source
        .parent()
        .map(|dir| dir.join(&config.file_name))
        .unwrap_or_else(|| PathBuf::from(&config.file_name));
    let description = format!("scale {:.2} spacing {:+}", config.scale, config.spacing);
    write_protected(history, "tweak width", &path, &renamed, &description)?;
    progress.log(format!("Saved {}", path.display()));
    progress.finish();

    Ok(GeometryOutput {
        path,
        glyph_count: output.glyph_count,
        dropped_tables: output.dropped_tables,
    })
}
