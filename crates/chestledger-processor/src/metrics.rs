//! Metrics collected while building the ledger from cache files

use crate::types::{ProcessOutcome, ProcessStatus};
use std::time::Duration;

/// A cache file that could not be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// File path
    pub file: String,
    /// Why it was skipped
    pub reason: String,
}

/// Counters for one batch build
#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    /// Files handed to the batch
    pub files_total: usize,
    /// Files merged into the ledger
    pub files_processed: usize,
    /// Files skipped after a failure
    pub failures: Vec<FileFailure>,
    /// Chest boxes parsed across merged files
    pub chest_boxes: usize,
    /// Names rewritten to a roster member
    pub names_corrected: usize,
    /// Names registered as new roster members
    pub members_added: usize,
    /// Points awarded
    pub points_awarded: u64,
    /// Rewards forwarded to the rewards sink
    pub rewards: usize,
    /// Files with trailing lines too short to form a box
    pub underruns: usize,
    /// Whether the batch stopped on cancellation
    pub cancelled: bool,
    /// Wall time of the batch
    pub elapsed: Duration,
}

impl BatchMetrics {
    /// Empty metrics for a batch of `files_total` files
    pub fn new(files_total: usize) -> Self {
        Self {
            files_total,
            ..Self::default()
        }
    }

    /// Record a merged file
    pub fn record_outcome(&mut self, outcome: &ProcessOutcome) {
        self.files_processed += 1;
        self.chest_boxes += outcome.stats.boxes_parsed;
        self.names_corrected += outcome.stats.names_corrected;
        self.members_added += outcome.stats.members_added;
        self.points_awarded += outcome.stats.points_awarded;
        self.rewards += outcome.rewards.len();
        if outcome.underrun.is_some() {
            self.underruns += 1;
        }
    }

    /// Record a skipped file
    pub fn record_failure(&mut self, file: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(FileFailure {
            file: file.into(),
            reason: reason.into(),
        });
    }

    /// Number of skipped files
    pub fn files_failed(&self) -> usize {
        self.failures.len()
    }

    /// Files processed or skipped so far
    pub fn files_seen(&self) -> usize {
        self.files_processed + self.files_failed()
    }

    /// Whether a status should skip the file
    pub fn is_skipped(status: ProcessStatus) -> bool {
        status.is_failure()
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Batch Build Summary".to_string(),
            "===================".to_string(),
            format!("Files: {}/{} merged, {} skipped", self.files_processed, self.files_total, self.files_failed()),
            format!("Chest boxes parsed: {}", self.chest_boxes),
            format!("Names corrected: {}", self.names_corrected),
            format!("Members added: {}", self.members_added),
            format!("Points awarded: {}", self.points_awarded),
            format!("Rewards recorded: {}", self.rewards),
            format!("Elapsed: {:.2}s", self.elapsed.as_secs_f64()),
        ];

        if self.underruns > 0 {
            lines.push(format!("Files with incomplete trailing box: {}", self.underruns));
        }
        if self.cancelled {
            lines.push("Cancelled before all files were processed".to_string());
        }
        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Skipped files:".to_string());
            for failure in &self.failures {
                lines.push(format!("  {}: {}", failure.file, failure.reason));
            }
        }

        lines.join("\n")
    }
}
