use std::path::PathBuf;

use anyhow::{Context, Result};
use galfont_charmap::{
    AllocationOutcome, CodePage, Corpus, DEFAULT_EXTENSIONS, allocate, parse_extensions,
};

use crate::{Reporter, TaskError, io::require_exists, reporter::Progress, tasks::font_charset};

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub corpus_dir: PathBuf,
    /// Mirrored, rewritten corpus goes here.
    pub output_dir: PathBuf,
    pub mapping_path: PathBuf,
    /// `;`-separated, leading dots optional.
    pub extensions: String,
    pub code_page: CodePage,
    /// Restricts both safe characters and proxies to this font's charset.
    pub reference_font: Option<PathBuf>,
}

impl MapConfig {
    pub fn new(
        corpus_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        mapping_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            corpus_dir: corpus_dir.into(),
            output_dir: output_dir.into(),
            mapping_path: mapping_path.into(),
            extensions: DEFAULT_EXTENSIONS.to_string(),
            code_page: CodePage::default(),
            reference_font: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    /// Nothing needed a proxy; no file was written.
    NothingToMap { safe: usize },
    Mapped {
        mapping_path: PathBuf,
        pairs: usize,
        files_written: usize,
    },
}

/// Scans the corpus, allocates proxies, saves the mapping and writes the
/// rewritten corpus.
///
/// A proxy pool that is too small fails before anything is written.
pub fn generate_mapping(config: &MapConfig, reporter: &mut dyn Reporter) -> Result<MapOutcome> {
    let mut progress = Progress::new(reporter);
    require_exists(&config.corpus_dir)?;
    if let Some(reference) = &config.reference_font {
        require_exists(reference)?;
    }

    progress.log(format!("Scanning {}", config.corpus_dir.display()));
    progress.set(5);
    let corpus = Corpus::discover(&config.corpus_dir, &parse_extensions(&config.extensions))?;
    if corpus.is_empty() {
        return Err(TaskError::EmptyCorpus(config.corpus_dir.clone()).into());
    }
    let chars = corpus.characters();
    progress.log(format!(
        "Found {} unique characters in {} files",
        chars.len(),
        corpus.files().len()
    ));
    progress.set(20);

    let reference = match &config.reference_font {
        Some(path) => {
            progress.log(format!("Restricting to the charset of {}", path.display()));
            Some(font_charset(path)?)
        }
        None => None,
    };

    let outcome = allocate(&chars, config.code_page, reference.as_ref())
        .context("Failed to allocate proxy characters")?;
    let (mapping, safe, pool_size) = match outcome {
        AllocationOutcome::NothingToMap { safe } => {
            progress.log(format!(
                "All {safe} characters are representable in {}; nothing to map",
                config.code_page
            ));
            progress.finish();
            return Ok(MapOutcome::NothingToMap { safe });
        }
        AllocationOutcome::Mapped {
            mapping,
            safe,
            pool_size,
        } => (mapping, safe, pool_size),
    };
    progress.log(format!(
        "{safe} characters kept, {} mapped ({pool_size} proxies available)",
        mapping.len()
    ));
    progress.set(40);

    mapping
        .save(&config.mapping_path)
        .with_context(|| format!("Failed to save mapping: {}", config.mapping_path.display()))?;
    progress.log(format!("Saved mapping to {}", config.mapping_path.display()));
    progress.set(50);

    let files_written = corpus.rewrite(&mapping, &config.output_dir, |index, total| {
        progress.step(50, 50, index, total)
    })?;
    progress.log(format!(
        "Wrote {files_written} files to {}",
        config.output_dir.display()
    ));
    progress.finish();

    Ok(MapOutcome::Mapped {
        mapping_path: config.mapping_path.clone(),
        pairs: mapping.len(),
        files_written,
    })
}
