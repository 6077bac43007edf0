//! Per-character script conversion (traditional ↔ simplified Chinese).

use std::{collections::HashMap, fs, path::Path};

use log::debug;

use crate::{RemapError, Result};

/// Converts a single character to its counterpart in another script variant.
///
/// Characters without a counterpart are returned unchanged.
pub trait ScriptConverter {
    fn convert(&self, ch: char) -> char;
}

impl<F: Fn(char) -> char> ScriptConverter for F {
    fn convert(&self, ch: char) -> char {
        self(ch)
    }
}

/// A converter backed by an OpenCC-style character table.
///
/// Each line holds a source character, a tab, and one or more
/// space-separated candidates; the first candidate is used. Lines starting
/// with `#` and phrase entries (more than one character on either side) are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct DictionaryConverter {
    table: HashMap<char, char>,
}

impl DictionaryConverter {
    pub fn parse(text: &str) -> Self {
        let mut table = HashMap::new();
        for line in text.lines() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((source, candidates)) = line.split_once('\t') else {
                continue;
            };
            let Some(target) = candidates.split_whitespace().next() else {
                continue;
            };
            if let (Some(s), Some(t)) = (single_char(source), single_char(target)) {
                table.entry(s).or_insert(t);
            }
        }
        debug!("Loaded {} conversion entries", table.len());
        Self { table }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| RemapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl ScriptConverter for DictionaryConverter {
    fn convert(&self, ch: char) -> char {
        self.table.get(&ch).copied().unwrap_or(ch)
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    chars.next().filter(|_| chars.next().is_none())
}
