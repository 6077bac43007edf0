use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use log::debug;
use read_fonts::types::GlyphId;

use crate::{Error, FontTables, Result};

pub const DEFAULT_CACHE_CAPACITY: usize = 10;
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(300);

/// Font bytes plus the best cmap, parsed once.
#[derive(Debug)]
pub struct CachedFont {
    pub data: Vec<u8>,
    pub cmap: BTreeMap<u32, GlyphId>,
}

impl CachedFont {
    pub fn charset(&self) -> BTreeSet<char> {
        self.cmap.keys().filter_map(|cp| char::from_u32(*cp)).collect()
    }
}

type CacheKey = (PathBuf, Option<SystemTime>);

struct Entry {
    font: Arc<CachedFont>,
    last_access: Instant,
}

/// Bounded cache of parsed fonts keyed by absolute path and modification time.
///
/// A file that changes on disk gets a new key, so stale entries are never
/// returned; they age out or get evicted by least recent access.
pub struct CharsetCache {
    capacity: usize,
    max_age: Duration,
    entries: HashMap<CacheKey, Entry>,
}

impl Default for CharsetCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_MAX_AGE)
    }
}

impl CharsetCache {
    pub fn new(capacity: usize, max_age: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            max_age,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(path: &Path) -> Result<CacheKey> {
        let abs = fs::canonicalize(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mtime = fs::metadata(&abs).and_then(|m| m.modified()).ok();
        Ok((abs, mtime))
    }

    /// Returns the cached font for `path`, reading and parsing it on a miss.
    pub fn get_or_open(&mut self, path: &Path) -> Result<Arc<CachedFont>> {
        let key = Self::key(path)?;
        let now = Instant::now();

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_access = now;
            return Ok(Arc::clone(&entry.font));
        }

        self.evict(now);

        let data = fs::read(&key.0).map_err(|source| Error::Io {
            path: key.0.clone(),
            source,
        })?;
        let cmap = FontTables::new(&data)?.best_cmap();
        let font = Arc::new(CachedFont { data, cmap });
        debug!("Cached {} ({} code points)", key.0.display(), font.cmap.len());

        self.entries.insert(
            key,
            Entry {
                font: Arc::clone(&font),
                last_access: now,
            },
        );
        Ok(font)
    }

    /// Character set of the best cmap of the font at `path`.
    pub fn charset(&mut self, path: &Path) -> Result<BTreeSet<char>> {
        Ok(self.get_or_open(path)?.charset())
    }

    /// Drops every entry for `path`, whatever its modification time.
    pub fn invalidate(&mut self, path: &Path) {
        let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.entries.retain(|(p, _), _| *p != abs);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict(&mut self, now: Instant) {
        let max_age = self.max_age;
        self.entries
            .retain(|_, e| now.duration_since(e.last_access) <= max_age);

        while self.entries.len() >= self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_access)
                .map(|(k, _)| k.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFont;

    fn write_font(dir: &Path, name: &str, chars: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, TestFont::new(1000).glyphs(chars.chars(), 500).build()).unwrap();
        path
    }

    #[test]
    fn test_hit_returns_same_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_font(dir.path(), "a.ttf", "AB");
        let mut cache = CharsetCache::default();

        let first = cache.get_or_open(&path).unwrap();
        let second = cache.get_or_open(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.charset(), BTreeSet::from(['A', 'B']));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_least_recent() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_font(dir.path(), "a.ttf", "A");
        let b = write_font(dir.path(), "b.ttf", "B");
        let c = write_font(dir.path(), "c.ttf", "C");
        let mut cache = CharsetCache::new(2, DEFAULT_CACHE_MAX_AGE);

        let first_a = cache.get_or_open(&a).unwrap();
        cache.get_or_open(&b).unwrap();
        cache.get_or_open(&a).unwrap();
        cache.get_or_open(&c).unwrap();
        assert_eq!(cache.len(), 2);

        // a was touched after b, so b is the one that was evicted
        let again_a = cache.get_or_open(&a).unwrap();
        assert!(Arc::ptr_eq(&first_a, &again_a));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_font(dir.path(), "a.ttf", "A");
        let b = write_font(dir.path(), "b.ttf", "B");
        let mut cache = CharsetCache::default();

        cache.get_or_open(&a).unwrap();
        cache.get_or_open(&b).unwrap();
        cache.invalidate(&a);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut cache = CharsetCache::default();
        let err = cache.get_or_open(Path::new("/nonexistent/font.ttf")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
