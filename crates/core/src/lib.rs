//! galfont core: the tasks behind every command, plus the progress and
//! history plumbing they share.

pub mod config;
mod error;
mod history;
pub mod io;
mod reporter;
pub mod tasks;

pub use error::TaskError;
pub use galfont_charmap::CodePage;
pub use galfont_font_ops::CharsetCache;
pub use history::{BackupHistory, History, HistoryEntry, NullHistory};
pub use reporter::{LogReporter, MemoryReporter, Progress, Reporter};
pub use tasks::*;
