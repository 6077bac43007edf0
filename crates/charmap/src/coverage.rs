//! Ranking of fallback fonts by how many missing characters they cover.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{CharmapError, Result, text::is_printable};

/// How many of the missing characters one candidate covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCoverage {
    pub name: String,
    pub covered: BTreeSet<char>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageReport {
    /// Missing characters of the primary font.
    pub missing: BTreeSet<char>,
    /// Candidates covering at least one missing character, best first.
    pub ranking: Vec<CandidateCoverage>,
    /// Missing character → name of the candidate it was assigned to.
    pub assignment: BTreeMap<char, String>,
    /// Missing characters no candidate covers.
    pub unresolved: BTreeSet<char>,
}

/// Printable, non-whitespace characters a corpus needs rendered.
pub fn needed_characters(raw: &BTreeSet<char>) -> BTreeSet<char> {
    raw.iter()
        .copied()
        .filter(|c| is_printable(*c) && !c.is_whitespace())
        .collect()
}

/// `*.ttf` and `*.otf` files directly inside `dir`, sorted by file name.
pub fn fallback_candidates(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CharmapError::InputNotFound(dir.to_path_buf()));
    }
    let mut fonts: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(CharmapError::io(dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
        })
        .collect();
    fonts.sort();
    Ok(fonts)
}

/// Assigns every missing character to the best-ranked candidate covering it.
///
/// Candidates are ranked by covered count, descending; ties keep the order
/// in which they were supplied. Each candidate then takes every missing
/// character it covers that no better candidate already took.
pub fn assign_coverage(
    needed: &BTreeSet<char>,
    primary: &BTreeSet<char>,
    candidates: impl IntoIterator<Item = (String, BTreeSet<char>)>,
) -> CoverageReport {
    let missing: BTreeSet<char> = needed.difference(primary).copied().collect();
    if missing.is_empty() {
        return CoverageReport::default();
    }

    let mut ranking: Vec<CandidateCoverage> = candidates
        .into_iter()
        .map(|(name, charset)| CandidateCoverage {
            covered: missing.intersection(&charset).copied().collect(),
            name,
        })
        .filter(|c| !c.covered.is_empty())
        .collect();
    ranking.sort_by(|a, b| b.covered.len().cmp(&a.covered.len()));

    let mut unresolved = missing.clone();
    let mut assignment = BTreeMap::new();
    for candidate in &ranking {
        if unresolved.is_empty() {
            break;
        }
        let contributed: Vec<char> = candidate.covered.intersection(&unresolved).copied().collect();
        for ch in contributed {
            unresolved.remove(&ch);
            assignment.insert(ch, candidate.name.clone());
        }
    }

    info!(
        "Resolved {} of {} missing characters",
        assignment.len(),
        missing.len()
    );
    CoverageReport {
        missing,
        ranking,
        assignment,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(s: &str) -> BTreeSet<char> {
        s.chars().collect()
    }

    #[test]
    fn test_needed_characters_filter() {
        assert_eq!(needed_characters(&set("a b\n\u{3000}。")), set("ab。"));
    }

    #[test]
    fn test_nothing_missing() {
        let report = assign_coverage(&set("ab"), &set("abc"), [("x.ttf".into(), set("ab"))]);
        assert_eq!(report, CoverageReport::default());
    }

    #[test]
    fn test_greedy_assignment() {
        let report = assign_coverage(
            &set("abcde"),
            &set("a"),
            [
                ("small.ttf".to_string(), set("b")),
                ("big.ttf".to_string(), set("bcd")),
                ("tie.ttf".to_string(), set("b")),
                ("none.ttf".to_string(), set("z")),
            ],
        );

        let names: Vec<&str> = report.ranking.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["big.ttf", "small.ttf", "tie.ttf"]);
        assert_eq!(report.assignment.get(&'b').map(String::as_str), Some("big.ttf"));
        assert_eq!(report.assignment.len(), 3);
        assert_eq!(report.unresolved, set("e"));
    }

    #[test]
    fn test_fallback_candidates_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.otf", "a.TTF", "c.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let found = fallback_candidates(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.TTF", "b.otf"]);
    }
}
