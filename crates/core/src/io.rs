//! Font and output file helpers shared by the tasks.

use std::{
    fs::{self, create_dir_all},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::{History, TaskError, config::FONT_EXTENSION};

/// Reads an input that must exist, failing with [`TaskError::InputNotFound`]
/// before anything else happens.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    require_exists(path)?;
    fs::read(path).with_context(|| format!("Failed to read: {}", path.display()))
}

pub fn require_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(TaskError::InputNotFound(path.to_path_buf()).into());
    }
    Ok(())
}

/// Create parent directory if it doesn't exist.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// `{dir or source dir}/{file_name}`, with `.ttf` appended when the name has
/// no such extension.
pub fn font_output_path(source: &Path, output_dir: Option<&Path>, file_name: &str) -> PathBuf {
    let dir = output_dir
        .filter(|d| !d.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| source.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let suffix = format!(".{FONT_EXTENSION}");
    let name = if file_name.to_ascii_lowercase().ends_with(&suffix) {
        file_name.to_string()
    } else {
        format!("{file_name}{suffix}")
    };
    dir.join(name)
}

/// Writes `data` to `path` under history protection.
///
/// An existing file is backed up first; a file that did not exist is
/// registered as new once written. A failure between the two steps leaves
/// the backup as the recovery point.
pub fn write_protected(
    history: &mut dyn History,
    action: &str,
    path: &Path,
    data: &[u8],
    description: &str,
) -> Result<()> {
    ensure_parent_dir(path)?;
    let existed = path.exists();
    if existed {
        history.record_before_overwrite(action, path, description)?;
    }
    fs::write(path, data).with_context(|| format!("Failed to write: {}", path.display()))?;
    if !existed {
        history.record_new_file(action, path, description)?;
    }
    Ok(())
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Size in KiB, for log lines.
pub fn kib(len: usize) -> f64 {
    len as f64 / 1024.0
}
