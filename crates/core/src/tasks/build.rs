use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use galfont_charmap::CharacterMapping;
use galfont_font_remap::{
    DictionaryConverter, RemapMode, RemapReport, RemapRequest, ScriptConverter, rebuild,
};

use crate::{
    History, Reporter,
    config::DEFAULT_FAMILY_NAME,
    io::{file_name, font_output_path, require_exists, write_protected},
    reporter::Progress,
    tasks::read_quadratic,
};

const ACTION: &str = "build font";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Proxies show the glyphs of the characters they stand for.
    Forward,
    /// Mapped characters show the glyphs of their proxies.
    Reverse,
    DisguiseOnly,
    TraditionalToSimplified,
    SimplifiedToTraditional,
}

impl BuildMode {
    fn needs_mapping(self) -> bool {
        matches!(self, Self::Forward | Self::Reverse)
    }

    fn needs_converter(self) -> bool {
        matches!(
            self,
            Self::TraditionalToSimplified | Self::SimplifiedToTraditional
        )
    }
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub source: PathBuf,
    pub mode: BuildMode,
    pub mapping: Option<PathBuf>,
    /// Supplies glyphs for mapped characters the source font lacks.
    pub fallback: Option<PathBuf>,
    /// Character table for the script conversion modes.
    pub conversion_table: Option<PathBuf>,
    pub file_name: String,
    pub family_name: String,
    /// Defaults to the directory of `source`.
    pub output_dir: Option<PathBuf>,
}

impl BuildConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        mode: BuildMode,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            mode,
            mapping: None,
            fallback: None,
            conversion_table: None,
            file_name: file_name.into(),
            family_name: DEFAULT_FAMILY_NAME.to_string(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub path: PathBuf,
    pub report: RemapReport,
}

/// Rebuilds the source font in the chosen mode and saves it under history
/// protection.
pub fn build_font(
    config: &BuildConfig,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<BuildOutput> {
    let mut progress = Progress::new(reporter);
    require_exists(&config.source)?;

    let mapping = if config.mode.needs_mapping() {
        let Some(path) = &config.mapping else {
            bail!("{:?} mode needs a mapping document", config.mode);
        };
        Some(
            CharacterMapping::load(path)
                .with_context(|| format!("Failed to load mapping: {}", path.display()))?,
        )
    } else {
        None
    };
    let converter = if config.mode.needs_converter() {
        let Some(path) = &config.conversion_table else {
            bail!("{:?} mode needs a conversion table", config.mode);
        };
        require_exists(path)?;
        Some(DictionaryConverter::load(path)?)
    } else {
        None
    };

    let path = font_output_path(&config.source, config.output_dir.as_deref(), &config.file_name);
    progress.log(format!(
        "Building {} from {} ({:?})",
        file_name(&path),
        file_name(&config.source),
        config.mode
    ));
    progress.set(10);

    let data = read_quadratic(&config.source, "source font", &mut progress)?;
    let fallback = match (&config.fallback, config.mode.needs_mapping()) {
        (Some(fallback), true) if fallback.exists() => {
            progress.log(format!("Using fallback font {}", file_name(fallback)));
            Some(read_quadratic(fallback, "fallback font", &mut progress)?)
        }
        (Some(fallback), true) => {
            progress.log(format!(
                "Fallback font {} not found; continuing without it",
                fallback.display()
            ));
            None
        }
        _ => None,
    };
    progress.set(30);

    let mode = match (config.mode, &mapping, &converter) {
        (BuildMode::Forward, Some(mapping), _) => RemapMode::Forward {
            mapping,
            fallback: fallback.as_deref(),
        },
        (BuildMode::Reverse, Some(mapping), _) => RemapMode::Reverse {
            mapping,
            fallback: fallback.as_deref(),
        },
        (BuildMode::TraditionalToSimplified, _, Some(c)) => {
            RemapMode::TraditionalToSimplified(c as &dyn ScriptConverter)
        }
        (BuildMode::SimplifiedToTraditional, _, Some(c)) => {
            RemapMode::SimplifiedToTraditional(c as &dyn ScriptConverter)
        }
        _ => RemapMode::DisguiseOnly,
    };
    let request = RemapRequest {
        mode,
        family_name: &config.family_name,
    };
    let output = rebuild(&data, &request)
        .with_context(|| format!("Failed to rebuild {}", config.source.display()))?;
    progress.set(80);

    let report = output.report;
    if let Some(scale) = report.scale {
        progress.log(format!("Fallback glyphs scaled by {scale:.2}"));
    }
    if report.transplanted > 0 {
        progress.log(format!(
            "Transplanted {} glyphs ({} including components)",
            report.transplanted, report.glyphs_added
        ));
    }
    for count in &report.subtables {
        progress.log(format!(
            "cmap ({}, {}): {} aliases",
            count.platform_id, count.encoding_id, count.aliased
        ));
    }
    for warning in &report.warnings {
        progress.log(format!("Warning: {warning}"));
    }
    if !report.missing.is_empty() {
        progress.log(format!(
            "{} characters have no glyph: {}",
            report.missing.len(),
            report.missing_summary()
        ));
    }

    write_protected(history, ACTION, &path, &output.data, &config.family_name)?;
    progress.log(format!("Saved {}", path.display()));
    progress.finish();
    Ok(BuildOutput { path, report })
}
