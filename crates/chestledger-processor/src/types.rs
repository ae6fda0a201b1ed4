//! Request and result types for chest processing

use crate::segmenter::SegmentUnderrun;
use chestledger_domain::ChestData;
use std::fmt;
use std::path::PathBuf;

/// Line prefix marking the reward line of an expired chest
pub const CONTAINS_MARKER: &str = "Contains:";

/// One fixed-width group of captured lines (3 or 4)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChestBox {
    lines: Vec<String>,
}

impl ChestBox {
    /// Wrap the lines of one box
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Lines in capture order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines in the box
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the box has no lines
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether the box carries a reward line
    pub fn has_contains(&self) -> bool {
        self.lines.iter().any(|l| l.starts_with(CONTAINS_MARKER))
    }
}

/// Outcome classification surfaced to automation callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// Capture processed and merged
    Success,
    /// The capture reports no gifts available
    NoGifts,
    /// A captured line matched no configured tag (warning)
    FilteringError,
    /// A chest box was shorter than its fields require
    ParseIndexError,
    /// The clanmate name could not be extracted
    ClanmateExtractionError,
    /// Persisted ledger keys do not match the date format
    DataCorrupt,
}

impl ProcessStatus {
    /// Numeric result code
    pub fn code(&self) -> u16 {
        match self {
            ProcessStatus::Success => 200,
            ProcessStatus::NoGifts => 404,
            ProcessStatus::FilteringError => 400,
            ProcessStatus::ParseIndexError => 416,
            ProcessStatus::ClanmateExtractionError => 422,
            ProcessStatus::DataCorrupt => 500,
        }
    }

    /// Whether processing stopped without merging the capture
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ProcessStatus::ParseIndexError
                | ProcessStatus::ClanmateExtractionError
                | ProcessStatus::DataCorrupt
        )
    }

    /// Whether the capture was merged but something needs attention
    pub fn is_warning(&self) -> bool {
        matches!(self, ProcessStatus::FilteringError)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProcessStatus::Success => "success",
            ProcessStatus::NoGifts => "no-gifts",
            ProcessStatus::FilteringError => "filtering-error",
            ProcessStatus::ParseIndexError => "parse-index-error",
            ProcessStatus::ClanmateExtractionError => "clanmate-extraction-error",
            ProcessStatus::DataCorrupt => "data-corrupt",
        };
        write!(f, "{}", label)
    }
}

/// A reward seen on an expired chest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRecord {
    /// Chest type
    pub chest_type: String,
    /// Chest level
    pub level: u32,
    /// Reward text after the `Contains:` marker
    pub reward: String,
}

/// Result of parsing a sequence of chest boxes
#[derive(Debug, Clone)]
pub struct ParseOutput {
    /// Success, or the parse failure that stopped the pass
    pub status: ProcessStatus,
    /// Human-readable message
    pub message: String,
    /// Chests parsed before any failure
    pub chest_data: Vec<ChestData>,
    /// Rewards registered by parsed boxes
    pub rewards: Vec<RewardRecord>,
    /// Clan header boxes skipped
    pub skipped: usize,
}

impl Default for ParseOutput {
    fn default() -> Self {
        Self {
            status: ProcessStatus::Success,
            message: "Success".to_string(),
            chest_data: Vec::new(),
            rewards: Vec::new(),
            skipped: 0,
        }
    }
}

impl ParseOutput {
    /// Whether parsing stopped on a failure
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// Counters for one processed capture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeStats {
    /// Chest boxes parsed into chests
    pub boxes_parsed: usize,
    /// Names rewritten to a roster member
    pub names_corrected: usize,
    /// Names registered as new roster members
    pub members_added: usize,
    /// Points added across all members
    pub points_awarded: u64,
}

/// Result of processing one capture or cache file
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Outcome classification
    pub status: ProcessStatus,
    /// Human-readable message
    pub message: String,
    /// Ledger date key the capture was merged into
    pub date_key: Option<String>,
    /// Parsed chests, after identity resolution when the capture was merged
    pub chest_data: Vec<ChestData>,
    /// Rewards forwarded to the rewards sink
    pub rewards: Vec<RewardRecord>,
    /// Trailing lines too short to form a box
    pub underrun: Option<SegmentUnderrun>,
    /// Cache file written by `process_to_cache`
    pub cache_file: Option<PathBuf>,
    /// Counters
    pub stats: OutcomeStats,
}

impl ProcessOutcome {
    /// Outcome with the given status and message and nothing else
    pub fn new(status: ProcessStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            date_key: None,
            chest_data: Vec::new(),
            rewards: Vec::new(),
            underrun: None,
            cache_file: None,
            stats: OutcomeStats::default(),
        }
    }

    /// The "no gifts available" outcome
    pub fn no_gifts() -> Self {
        Self::new(ProcessStatus::NoGifts, "No Gifts")
    }

    /// Numeric result code
    pub fn code(&self) -> u16 {
        self.status.code()
    }
}
