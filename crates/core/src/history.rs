//! File-level undo/redo backed by timestamped copies.

use std::{
    collections::VecDeque,
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{HISTORY_DIR_NAME, HISTORY_LIMIT};

/// Stacks file inside the history directory.
const JOURNAL_FILE: &str = "journal.json";

/// One recorded file mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: String,
    pub path: PathBuf,
    /// Copy to restore from. `None` for a new file that has not been undone.
    pub backup: Option<PathBuf>,
    pub description: String,
    pub time: DateTime<Local>,
    /// The mutation created `path` instead of replacing it.
    pub new_file: bool,
}

/// Overwrite protection for task outputs.
///
/// The `record*` methods return `Ok(false)` when `path` does not exist.
pub trait History {
    /// Backs up the current content of `path`.
    fn record(&mut self, action: &str, path: &Path, description: &str) -> Result<bool>;

    /// Registers a file that a task has just created.
    fn record_new_file(&mut self, action: &str, path: &Path, description: &str) -> Result<bool>;

    /// Reverts the latest entry. `Ok(None)` when there is nothing to undo.
    fn undo(&mut self) -> Result<Option<HistoryEntry>>;

    /// Re-applies the latest undone entry.
    fn redo(&mut self) -> Result<Option<HistoryEntry>>;

    fn record_before_overwrite(
        &mut self,
        action: &str,
        path: &Path,
        description: &str,
    ) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        self.record(action, path, &format!("{description} [before overwrite]"))
    }
}

/// Records nothing; undo and redo are always empty.
#[derive(Debug, Default)]
pub struct NullHistory;

impl History for NullHistory {
    fn record(&mut self, _: &str, _: &Path, _: &str) -> Result<bool> {
        Ok(false)
    }

    fn record_new_file(&mut self, _: &str, _: &Path, _: &str) -> Result<bool> {
        Ok(false)
    }

    fn undo(&mut self) -> Result<Option<HistoryEntry>> {
        Ok(None)
    }

    fn redo(&mut self) -> Result<Option<HistoryEntry>> {
        Ok(None)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Journal {
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
}

/// Bounded undo and redo stacks of whole-file copies kept in one directory.
///
/// The stacks are saved to a journal next to the copies after every change,
/// so a later process opening the same directory can undo earlier work.
#[derive(Debug)]
pub struct BackupHistory {
    dir: PathBuf,
    limit: usize,
    sequence: u64,
    undo: VecDeque<HistoryEntry>,
    redo: VecDeque<HistoryEntry>,
}

impl BackupHistory {
    pub fn new(dir: impl Into<PathBuf>, limit: usize) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create history directory: {}", dir.display()))?;

        let journal_path = dir.join(JOURNAL_FILE);
        let journal = if journal_path.exists() {
            let text = fs::read_to_string(&journal_path)
                .with_context(|| format!("Failed to read {}", journal_path.display()))?;
            serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Ignoring corrupt history journal {}: {e}", journal_path.display());
                Journal::default()
            })
        } else {
            Journal::default()
        };

        Ok(Self {
            dir,
            limit: limit.max(1),
            sequence: 0,
            undo: journal.undo,
            redo: journal.redo,
        })
    }

    /// History in `{temp}/galfont_history` with the default limit.
    pub fn in_temp_dir() -> Result<Self> {
        Self::new(env::temp_dir().join(HISTORY_DIR_NAME), HISTORY_LIMIT)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undo entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter().rev()
    }

    /// Forgets every entry and deletes the backup files.
    pub fn clear(&mut self) -> Result<()> {
        self.undo.clear();
        self.redo.clear();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to list {}", self.dir.display()))?
            .flatten()
        {
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!("Could not remove {}: {e}", entry.path().display());
            }
        }
        Ok(())
    }

    fn save_journal(&self) -> Result<()> {
        let path = self.dir.join(JOURNAL_FILE);
        let journal = Journal {
            undo: self.undo.clone(),
            redo: self.redo.clone(),
        };
        let text = serde_json::to_string_pretty(&journal)?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn backup_copy(&mut self, path: &Path, prefix: &str) -> Result<PathBuf> {
        let stamp = Local::now().format("%Y%m%d_%H%M%S_%f");
        self.sequence += 1;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let backup = self.dir.join(format!("{prefix}{stamp}_{}_{name}", self.sequence));
        fs::copy(path, &backup).with_context(|| {
            format!("Failed to back up {} to {}", path.display(), backup.display())
        })?;
        debug!("Backed up {} as {}", path.display(), backup.display());
        Ok(backup)
    }

    fn push(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, limit: usize) {
        stack.push_back(entry);
        while stack.len() > limit {
            stack.pop_front();
        }
    }

    fn push_undo(&mut self, entry: HistoryEntry) {
        Self::push(&mut self.undo, entry, self.limit);
    }

    fn push_redo(&mut self, entry: HistoryEntry) {
        Self::push(&mut self.redo, entry, self.limit);
    }

    fn restore(from: &Path, to: &Path) -> Result<()> {
        fs::copy(from, to)
            .with_context(|| format!("Failed to restore {} from {}", to.display(), from.display()))?;
        Ok(())
    }
}

impl History for BackupHistory {
    fn record(&mut self, action: &str, path: &Path, description: &str) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        let backup = self.backup_copy(path, "")?;
        self.push_undo(HistoryEntry {
            action: action.to_string(),
            path: path.to_path_buf(),
            backup: Some(backup),
            description: description.to_string(),
            time: Local::now(),
            new_file: false,
        });
        self.redo.clear();
        self.save_journal()?;
        Ok(true)
    }

    fn record_new_file(&mut self, action: &str, path: &Path, description: &str) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        self.push_undo(HistoryEntry {
            action: action.to_string(),
            path: path.to_path_buf(),
            backup: None,
            description: description.to_string(),
            time: Local::now(),
            new_file: true,
        });
        self.redo.clear();
        self.save_journal()?;
        Ok(true)
    }

    fn undo(&mut self) -> Result<Option<HistoryEntry>> {
        let Some(entry) = self.undo.pop_back() else {
            return Ok(None);
        };

        if entry.new_file {
            if !entry.path.exists() {
                bail!("{} no longer exists", entry.path.display());
            }
            let parked = self.backup_copy(&entry.path, "redo_")?;
            fs::remove_file(&entry.path)
                .with_context(|| format!("Failed to remove {}", entry.path.display()))?;
            self.push_redo(HistoryEntry {
                backup: Some(parked),
                ..entry.clone()
            });
            self.save_journal()?;
            return Ok(Some(entry));
        }

        let Some(backup) = entry.backup.as_deref().filter(|b| b.exists()) else {
            bail!("Backup of {} is missing", entry.path.display());
        };
        let current = if entry.path.exists() {
            Some(self.backup_copy(&entry.path, "redo_")?)
        } else {
            None
        };
        Self::restore(backup, &entry.path)?;

        let mut redo = entry.clone();
        if current.is_some() {
            redo.backup = current;
        }
        self.push_redo(redo);
        self.save_journal()?;
        Ok(Some(entry))
    }

    fn redo(&mut self) -> Result<Option<HistoryEntry>> {
        let Some(entry) = self.redo.pop_back() else {
            return Ok(None);
        };
        let Some(backup) = entry.backup.as_deref().filter(|b| b.exists()) else {
            bail!("Redo copy of {} is missing", entry.path.display());
        };

        if entry.new_file {
            Self::restore(backup, &entry.path)?;
            self.push_undo(HistoryEntry {
                backup: None,
                ..entry.clone()
            });
            self.save_journal()?;
            return Ok(Some(entry));
        }

        if entry.path.exists() {
            let previous = self.backup_copy(&entry.path, "")?;
            self.push_undo(HistoryEntry {
                backup: Some(previous),
                ..entry.clone()
            });
        }
        Self::restore(backup, &entry.path)?;
        self.save_journal()?;
        Ok(Some(entry))
    }
}
