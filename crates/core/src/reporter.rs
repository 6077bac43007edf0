//! Progress and log channels of a running task.

use log::{debug, info};

/// Receives the progress percentage and log lines of one task.
///
/// Tasks never call this directly; they go through [`Progress`], which keeps
/// the percentage within 0..=100 and never lets it go backwards.
pub trait Reporter {
    fn progress(&mut self, percent: u8);
    fn log(&mut self, message: &str);
}

/// Forwards everything to the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn progress(&mut self, percent: u8) {
        debug!("Progress {percent}%");
    }

    fn log(&mut self, message: &str) {
        info!("{message}");
    }
}

/// Collects progress and log lines in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    pub progress: Vec<u8>,
    pub lines: Vec<String>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn progress(&mut self, percent: u8) {
        self.progress.push(percent);
    }

    fn log(&mut self, message: &str) {
        self.lines.push(message.to_string());
    }
}

/// Monotonic view over a [`Reporter`].
pub struct Progress<'r> {
    reporter: &'r mut dyn Reporter,
    last: u8,
}

impl<'r> Progress<'r> {
    pub fn new(reporter: &'r mut dyn Reporter) -> Self {
        Self { reporter, last: 0 }
    }

    /// Reports `percent`, clamped to `last..=100`. Values that do not move
    /// the bar are swallowed.
    pub fn set(&mut self, percent: u32) {
        let percent = (percent.min(100) as u8).max(self.last);
        if percent > self.last {
            self.last = percent;
            self.reporter.progress(percent);
        }
    }

    /// Reports the position of `index` out of `total` mapped onto
    /// `start..start + span`.
    pub fn step(&mut self, start: u32, span: u32, index: usize, total: usize) {
        let fraction = if total == 0 {
            0
        } else {
            (span as u64 * index as u64 / total as u64) as u32
        };
        self.set(start + fraction);
    }

    pub fn log(&mut self, message: impl AsRef<str>) {
        self.reporter.log(message.as_ref());
    }

    pub fn finish(&mut self) {
        self.set(100);
    }

    pub fn last(&self) -> u8 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic_and_clamped() {
        let mut sink = MemoryReporter::new();
        {
            let mut progress = Progress::new(&mut sink);
            progress.set(10);
            progress.set(5);
            progress.set(10);
            progress.set(250);
        }
        assert_eq!(sink.progress, vec![10, 100]);
    }

    #[test]
    fn test_step_maps_onto_span() {
        let mut sink = MemoryReporter::new();
        let mut progress = Progress::new(&mut sink);
        progress.step(20, 40, 5, 10);
        assert_eq!(progress.last(), 40);
        progress.step(20, 40, 0, 0);
        assert_eq!(progress.last(), 40);
    }

    #[test]
    fn test_log_lines_collected() {
        let mut sink = MemoryReporter::new();
        Progress::new(&mut sink).log("Saved mapping");
        assert!(sink.contains("mapping"));
    }
}
