//! Task-level failures that callers may want to tell apart.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("no corpus files matching the extensions under {}", .0.display())]
    EmptyCorpus(PathBuf),
}
