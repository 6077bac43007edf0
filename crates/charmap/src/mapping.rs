//! The persisted source → proxy character mapping.

use std::{collections::BTreeMap, fs, path::Path};

use log::warn;
use serde_json::{Map, Value};

use crate::{CharmapError, Result};

/// A bijective mapping from characters needing relocation to their proxies,
/// ordered by source code point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterMapping(BTreeMap<char, char>);

impl From<BTreeMap<char, char>> for CharacterMapping {
    fn from(map: BTreeMap<char, char>) -> Self {
        Self(map)
    }
}

impl CharacterMapping {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, source: char) -> Option<char> {
        self.0.get(&source).copied()
    }

    /// `(source, proxy)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (char, char)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    pub fn sources(&self) -> impl Iterator<Item = char> + '_ {
        self.0.keys().copied()
    }

    pub fn proxies(&self) -> impl Iterator<Item = char> + '_ {
        self.0.values().copied()
    }

    /// Replaces every mapped character of `text`.
    pub fn apply(&self, text: &str) -> String {
        text.chars().map(|c| self.get(c).unwrap_or(c)).collect()
    }

    /// Parses a JSON object of single-character strings.
    ///
    /// Entries whose key or value is not exactly one character are skipped
    /// with a warning.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let object: Map<String, Value> = serde_json::from_str(text)?;
        let mut map = BTreeMap::new();
        for (key, value) in object {
            let single = |s: &str| {
                let mut chars = s.chars();
                chars.next().filter(|_| chars.next().is_none())
            };
            match (single(&key), value.as_str().and_then(single)) {
                (Some(k), Some(v)) => {
                    map.insert(k, v);
                }
                _ => warn!("Ignoring mapping entry {key:?}: {value}"),
            }
        }
        Ok(Self(map))
    }

    /// Pretty JSON with two-space indentation; non-ASCII is written as is.
    pub fn to_json(&self) -> String {
        let object: Map<String, Value> = self
            .0
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        // serializing a map of strings cannot fail
        serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CharmapError::InputNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(CharmapError::io(path))?;
        Self::from_json(&text).map_err(|source| CharmapError::Mapping {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(CharmapError::io(parent))?;
        }
        fs::write(path, self.to_json()).map_err(CharmapError::io(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_document_shape() {
        let mapping = CharacterMapping::from(BTreeMap::from([('好', '亞'), ('你', '亜')]));
        let json = mapping.to_json();
        assert_eq!(json, "{\n  \"你\": \"亜\",\n  \"好\": \"亞\"\n}");
        assert_eq!(CharacterMapping::from_json(&json).unwrap(), mapping);
    }

    #[test]
    fn test_from_json_skips_invalid_entries() {
        let mapping = CharacterMapping::from_json(r#"{"a": "b", "cd": "e", "f": 1}"#).unwrap();
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![('a', 'b')]);
    }

    #[test]
    fn test_apply() {
        let mapping = CharacterMapping::from(BTreeMap::from([('a', 'x')]));
        assert_eq!(mapping.apply("banana"), "bxnxnx");
    }

    #[test]
    fn test_load_missing_file() {
        let err = CharacterMapping::load(Path::new("/nonexistent/map.json")).unwrap_err();
        assert!(matches!(err, CharmapError::InputNotFound(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/map.json");
        let mapping = CharacterMapping::from(BTreeMap::from([('你', '亜')]));

        mapping.save(&path).unwrap();
        assert_eq!(CharacterMapping::load(&path).unwrap(), mapping);
    }
}
