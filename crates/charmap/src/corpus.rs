//! Discovery, scanning and rewriting of a text corpus.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use glob::Pattern;
use log::{debug, warn};
use serde_json::Value;

use crate::{CharacterMapping, CharmapError, Result};

/// Default corpus extensions.
pub const DEFAULT_EXTENSIONS: &str = "txt;json";

/// Splits a `;`-separated extension list, adding the leading dot where missing.
pub fn parse_extensions(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| if e.starts_with('.') { e.to_string() } else { format!(".{e}") })
        .collect()
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Every string value of a JSON document, at any depth. Object keys are skipped.
fn collect_json_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_json_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_json_strings(v, out)),
        _ => {}
    }
}

fn map_json_strings(value: Value, mapping: &CharacterMapping) -> Value {
    match value {
        Value::String(s) => Value::String(mapping.apply(&s)),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| map_json_strings(v, mapping)).collect())
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, map_json_strings(v, mapping)))
                .collect(),
        ),
        other => other,
    }
}

/// The files of a corpus directory that match a set of extensions.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Corpus {
    /// Recursively collects files under `root` ending in one of `extensions`.
    pub fn discover(root: &Path, extensions: &[String]) -> Result<Self> {
        if !root.is_dir() {
            return Err(CharmapError::InputNotFound(root.to_path_buf()));
        }

        let base = Pattern::escape(&root.to_string_lossy());
        let mut files = Vec::new();
        for ext in extensions {
            let pattern = format!("{base}/**/*{ext}");
            files.extend(glob::glob(&pattern)?.filter_map(|entry| entry.ok()));
        }
        files.retain(|p| p.is_file());
        files.sort();
        files.dedup();

        debug!("Found {} corpus files under {}", files.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn read(path: &Path) -> Option<String> {
        match fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Skipping unreadable file {}: {e}", path.display());
                None
            }
        }
    }

    /// Characters of the corpus text. JSON files contribute the characters of
    /// their string values; a JSON file that fails to parse counts as text.
    pub fn characters(&self) -> BTreeSet<char> {
        let mut chars = BTreeSet::new();
        for path in &self.files {
            let Some(text) = Self::read(path) else {
                continue;
            };
            if is_json(path)
                && let Ok(value) = serde_json::from_str::<Value>(&text)
            {
                let mut strings = Vec::new();
                collect_json_strings(&value, &mut strings);
                strings.iter().for_each(|s| chars.extend(s.chars()));
            } else {
                chars.extend(text.chars());
            }
        }
        chars
    }

    /// Every character of every file, including JSON syntax and keys.
    pub fn raw_characters(&self) -> BTreeSet<char> {
        self.files
            .iter()
            .filter_map(|path| Self::read(path))
            .flat_map(|text| text.chars().collect::<Vec<_>>())
            .collect()
    }

    /// Writes a mapped copy of every file into `out_dir`, mirroring relative
    /// paths. JSON keeps its shape and key order; only string values change.
    ///
    /// Returns the number of files written. Files that cannot be read or
    /// written are logged and skipped.
    pub fn rewrite(
        &self,
        mapping: &CharacterMapping,
        out_dir: &Path,
        mut on_file: impl FnMut(usize, usize),
    ) -> Result<usize> {
        fs::create_dir_all(out_dir).map_err(CharmapError::io(out_dir))?;

        let total = self.files.len();
        let mut written = 0;
        for (idx, path) in self.files.iter().enumerate() {
            on_file(idx, total);
            let Some(text) = Self::read(path) else {
                continue;
            };
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            let target = out_dir.join(relative);

            let output = if is_json(path) {
                match serde_json::from_str::<Value>(&text) {
                    Ok(value) => {
                        let mapped = map_json_strings(value, mapping);
                        serde_json::to_string_pretty(&mapped).map_err(|source| {
                            CharmapError::Mapping {
                                path: path.clone(),
                                source,
                            }
                        })?
                    }
                    Err(_) => {
                        warn!("{} is not valid JSON, rewriting as text", path.display());
                        mapping.apply(&text)
                    }
                }
            } else {
                mapping.apply(&text)
            };

            let result = target
                .parent()
                .map_or(Ok(()), fs::create_dir_all)
                .and_then(|_| fs::write(&target, output));
            match result {
                Ok(()) => written += 1,
                Err(e) => warn!("Failed to write {}: {e}", target.display()),
            }
        }
        Ok(written)
    }
}
