use std::path::PathBuf;

use anyhow::{Context, Result};
use galfont_charmap::{
    CoverageReport, Corpus, DEFAULT_EXTENSIONS, assign_coverage,
    coverage::{fallback_candidates, needed_characters},
    parse_extensions,
};
use galfont_font_ops::CharsetCache;
use indexmap::IndexMap;
use log::warn;

use crate::{
    Reporter,
    io::{file_name, require_exists},
    reporter::Progress,
};

#[derive(Debug, Clone)]
pub struct FallbackScanConfig {
    pub primary: PathBuf,
    /// `*.ttf` and `*.otf` files directly inside are candidates.
    pub fallback_dir: PathBuf,
    pub corpus_dir: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct FallbackScanOutput {
    pub report: CoverageReport,
    /// Characters each candidate contributes, best candidate first.
    pub contributions: IndexMap<String, Vec<char>>,
}

/// Ranks the fallback fonts by how many of the primary font's missing corpus
/// characters they cover, and assigns each missing character to the best one.
pub fn fallback_scan(
    config: &FallbackScanConfig,
    reporter: &mut dyn Reporter,
    cache: &mut CharsetCache,
) -> Result<FallbackScanOutput> {
    let mut progress = Progress::new(reporter);
    require_exists(&config.primary)?;
    require_exists(&config.fallback_dir)?;
    require_exists(&config.corpus_dir)?;
    progress.set(5);

    let corpus = Corpus::discover(&config.corpus_dir, &parse_extensions(DEFAULT_EXTENSIONS))?;
    let needed = needed_characters(&corpus.raw_characters());
    progress.log(format!("The corpus needs {} characters", needed.len()));
    progress.set(15);

    let primary = cache
        .charset(&config.primary)
        .with_context(|| format!("Failed to read {}", config.primary.display()))?;
    let missing = needed.difference(&primary).count();
    if missing == 0 {
        progress.log("The primary font covers every character");
        progress.finish();
        return Ok(FallbackScanOutput::default());
    }
    progress.log(format!("{missing} characters are missing; scanning fallback fonts"));
    progress.set(20);

    let paths = fallback_candidates(&config.fallback_dir)?;
    let mut candidates = Vec::with_capacity(paths.len());
    for (index, path) in paths.iter().enumerate() {
        match cache.charset(path) {
            Ok(charset) => candidates.push((file_name(path), charset)),
            Err(e) => warn!("Skipping {}: {e}", path.display()),
        }
        progress.step(20, 40, index, paths.len());
    }

    let report = assign_coverage(&needed, &primary, candidates);
    progress.log(format!("{} fonts cover missing characters:", report.ranking.len()));
    for (rank, candidate) in report.ranking.iter().enumerate() {
        progress.log(format!(
            "  #{} {} ({} characters)",
            rank + 1,
            candidate.name,
            candidate.covered.len()
        ));
    }

    let mut contributions: IndexMap<String, Vec<char>> = report
        .ranking
        .iter()
        .map(|c| (c.name.clone(), Vec::new()))
        .collect();
    for (ch, name) in &report.assignment {
        if let Some(chars) = contributions.get_mut(name) {
            chars.push(*ch);
        }
    }
    contributions.retain(|_, chars| !chars.is_empty());

    progress.log(format!(
        "Resolved {}, still missing {}",
        report.assignment.len(),
        report.unresolved.len()
    ));
    progress.finish();
    Ok(FallbackScanOutput {
        report,
        contributions,
    })
}
