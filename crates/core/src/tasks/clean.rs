use std::path::PathBuf;

use anyhow::{Context, Result};
use galfont_font_ops::{
    CleanupOptions, CleanupReport, FontTables, clean_tables, normalize_to_quadratic,
};

use crate::{
    History, Reporter,
    io::{file_name, kib, read_input, write_protected},
    reporter::Progress,
};

#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Table tags, plus the pseudo tags `NAME_DETAILED` and `HINTING`.
    pub tables: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub path: PathBuf,
    pub report: CleanupReport,
}

pub fn clean_font(
    config: &CleanConfig,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<CleanOutput> {
    let mut progress = Progress::new(reporter);
    let data = read_input(&config.source)?;
    progress.log(format!(
        "Cleaning {}: {}",
        file_name(&config.source),
        config.tables.join(", ")
    ));
    progress.set(10);

    let options = CleanupOptions::from_names(&config.tables);
    let (cleaned, report) = clean_tables(&data, &options)
        .with_context(|| format!("Failed to clean {}", config.source.display()))?;
    for tag in &report.removed {
        progress.log(format!("Removed {tag}"));
    }
    if report.names_trimmed {
        progress.log("Kept name ids 1 to 6 only");
    }
    progress.set(80);

    let description = format!("removed {} tables", report.removed.len());
    write_protected(history, "clean tables", &config.output, &cleaned, &description)?;
    progress.log(format!(
        "Saved {} ({:.1} KB -> {:.1} KB)",
        config.output.display(),
        kib(data.len()),
        kib(cleaned.len())
    ));
    progress.finish();

    Ok(CleanOutput {
        path: config.output.clone(),
        report,
    })
}

#[derive(Debug, Clone)]
pub struct NormalizeConfig {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Converts CFF outlines to glyf. A font that already has glyf outlines is
/// written out unchanged.
pub fn normalize_font(
    config: &NormalizeConfig,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<PathBuf> {
    let mut progress = Progress::new(reporter);
    let data = read_input(&config.source)?;
    let had_cff = FontTables::new(&data)
        .with_context(|| format!("Failed to parse {}", config.source.display()))?
        .has_cff();
    if had_cff {
        progress.log(format!("Converting {} to TrueType outlines", file_name(&config.source)));
    } else {
        progress.log(format!("{} already has TrueType outlines", file_name(&config.source)));
    }
    progress.set(10);

    let normalized = normalize_to_quadratic(&data)
        .with_context(|| format!("Failed to convert {}", config.source.display()))?;
    progress.set(90);

    write_protected(history, "normalize", &config.output, &normalized, &file_name(&config.source))?;
    progress.log(format!("Saved {}", config.output.display()));
    progress.finish();
    Ok(config.output.clone())
}
