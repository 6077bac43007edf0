use std::{collections::BTreeSet, fs, path::PathBuf};

use anyhow::{Context, Result};
use galfont_charmap::{CharacterMapping, Corpus, DEFAULT_EXTENSIONS, parse_extensions};
use galfont_font_subsetter::{SubsetReport, Subsetter, character_universe};

use crate::{
    History, Reporter,
    io::{file_name, kib, require_exists, write_protected},
    reporter::Progress,
    tasks::read_quadratic,
};

const ACTION: &str = "subset font";

#[derive(Debug, Clone)]
pub struct SubsetConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Every character of these files is kept.
    pub corpus_dir: Option<PathBuf>,
    /// Both sides of every entry are kept.
    pub mapping: Option<PathBuf>,
    pub extensions: String,
}

impl SubsetConfig {
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            corpus_dir: None,
            mapping: None,
            extensions: DEFAULT_EXTENSIONS.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubsetOutput {
    pub path: PathBuf,
    pub report: SubsetReport,
}

/// Keeps only the glyphs the corpus and mapping can reach.
pub fn subset_font(
    config: &SubsetConfig,
    reporter: &mut dyn Reporter,
    history: &mut dyn History,
) -> Result<SubsetOutput> {
    let mut progress = Progress::new(reporter);
    require_exists(&config.source)?;

    let mut corpus_chars = BTreeSet::new();
    if let Some(dir) = &config.corpus_dir {
        require_exists(dir)?;
        let corpus = Corpus::discover(dir, &parse_extensions(&config.extensions))?;
        corpus_chars = corpus.raw_characters();
        progress.log(format!(
            "Collected {} characters from {} files",
            corpus_chars.len(),
            corpus.files().len()
        ));
    }
    let mapping = match &config.mapping {
        Some(path) => Some(
            CharacterMapping::load(path)
                .with_context(|| format!("Failed to load mapping: {}", path.display()))?,
        ),
        None => None,
    };
    let universe = character_universe(&corpus_chars, mapping.as_ref());
    progress.log(format!("Keeping {} characters", universe.len()));
    progress.set(30);

    let original_size = fs::metadata(&config.source)
        .with_context(|| format!("Failed to stat {}", config.source.display()))?
        .len() as usize;
    let data = read_quadratic(&config.source, "source font", &mut progress)?;
    progress.set(40);

    let subset = Subsetter::new()
        .with_characters(universe.iter().copied())
        .subset(&data)
        .with_context(|| format!("Failed to subset {}", config.source.display()))?;
    progress.set(90);

    let report = SubsetReport {
        original_size,
        subset_size: subset.len(),
        kept_characters: universe.len(),
    };
    write_protected(history, ACTION, &config.output, &subset, &file_name(&config.source))?;
    progress.log(format!(
        "Subset {}: {:.1} KB -> {:.1} KB ({:.1}% smaller)",
        file_name(&config.output),
        kib(report.original_size),
        kib(report.subset_size),
        report.reduction_percent()
    ));
    progress.finish();

    Ok(SubsetOutput {
        path: config.output.clone(),
        report,
    })
}
