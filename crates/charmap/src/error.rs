//! Error types for corpus scanning and proxy allocation.

use std::{io, path::PathBuf, result};

/// Errors that can occur while building or applying a character mapping.
#[derive(Debug, thiserror::Error)]
pub enum CharmapError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("proxy pool too small: {needed} characters need mapping, {available} proxies available")]
    AllocationCapacity { needed: usize, available: usize },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid mapping document {path}: {source}")]
    Mapping {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl CharmapError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

pub type Result<T> = result::Result<T, CharmapError>;
