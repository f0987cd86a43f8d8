// ABOUTME: Dump orchestrators composing client, filter, renderer and writer
// ABOUTME: Shared run summary and day-by-day progress reporting

pub mod events;
pub mod observations;
pub mod reflections;

use crate::storage::WriteDecision;
use crate::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Per-run file counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub written: usize,
    pub skipped: usize,
}

impl Summary {
    pub fn record(&mut self, decision: WriteDecision) {
        match decision {
            WriteDecision::Written => self.written += 1,
            WriteDecision::SkippedExisting => self.skipped += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} written, {} skipped", self.written, self.skipped)
    }
}

/// Runs one dump, reporting how far it got if it fails midway.
pub(crate) fn run_counted<F>(body: F) -> Result<Summary>
where
    F: FnOnce(&mut Summary) -> Result<()>,
{
    let mut summary = Summary::default();
    match body(&mut summary) {
        Ok(()) => Ok(summary),
        Err(e) => {
            tracing::error!(written = summary.written, skipped = summary.skipped, "dump aborted");
            eprintln!("aborted: {}", summary);
            Err(e)
        }
    }
}

/// Progress bar over fetched days; hidden when output goes to stdout.
pub(crate) fn day_progress(days: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(days);
    if let Ok(style) = ProgressStyle::default_bar().template("[{bar:40}] {pos}/{len} days {msg}") {
        pb.set_style(style.progress_chars("##-"));
    }
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_summary_display() {
        let mut summary = Summary::default();
        summary.record(WriteDecision::Written);
        summary.record(WriteDecision::Written);
        summary.record(WriteDecision::SkippedExisting);
        assert_eq!(summary.to_string(), "2 written, 1 skipped");
    }

    #[test]
    fn test_run_counted_passes_error_through() {
        let result = run_counted(|summary| {
            summary.record(WriteDecision::Written);
            Err(Error::NotFound("observation 9".into()))
        });
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_run_counted_returns_counts() {
        let summary = run_counted(|summary| {
            summary.record(WriteDecision::SkippedExisting);
            Ok(())
        })
        .unwrap();
        assert_eq!(summary, Summary { written: 0, skipped: 1 });
    }
}
