//! Chestledger Processor
//!
//! Turns OCR text captured from the clan chest screen into per-date ledger
//! entries.
//!
//! # Architecture
//!
//! ```text
//! lines → LineFilter → ChestBoxSegmenter → ChestBoxParser
//!       → IdentityResolver → LedgerAggregator → LedgerStore
//! ```
//!
//! Filtering, segmentation and parsing run sequentially. Identity
//! resolution and aggregation run on a bounded worker pool, one task per
//! distinct name or member, with per-member locking on the working ledger.
//!
//! Parse problems are reported as a [`ProcessStatus`] on the returned
//! [`ProcessOutcome`]; `Err` is reserved for collaborator, I/O and
//! configuration failures and cancellation.
//!
//! # Example Usage
//!
//! ```no_run
//! use chestledger_processor::{ChestProcessor, ProcessorConfig};
//! use chestledger_store::SqliteStore;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(Mutex::new(SqliteStore::new("chests.db")?));
//! let processor = ChestProcessor::new(
//!     ProcessorConfig::default(),
//!     Arc::clone(&store),
//!     Arc::clone(&store),
//!     Arc::clone(&store),
//! )?;
//!
//! let capture: Vec<String> = vec![
//!     "Epic Chest".into(),
//!     "From: Bob".into(),
//!     "Source: Level 10 Crypt".into(),
//! ];
//! let outcome = processor.process(&capture).await?;
//! println!("{} ({})", outcome.status, outcome.code());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod aggregator;
mod batch;
mod cache;
mod clock;
mod config;
mod error;
mod filter;
mod ledger;
mod locale;
mod metrics;
mod parser;
mod processor;
mod progress;
mod resolver;
mod segmenter;
mod text;
mod types;
mod worker;


pub use aggregator::{group_by_clanmate, LedgerAggregator, MemberChests};
pub use cache::{cache_file_name, date_from_filename, list_cache_files, read_cache, write_cache, CachedCapture, CACHE_FILE_PREFIX};
pub use clock::{format_date_key, is_valid_date_key, DateSource, FixedClock, SystemClock};
pub use config::{LookaheadScope, MatchStrategy, ProcessorConfig};
pub use error::ProcessorError;
pub use filter::{FilterOutput, LineFilter};
pub use ledger::{MemberEntry, WorkingLedger};
pub use locale::LocaleStrings;
pub use metrics::{BatchMetrics, FileFailure};
pub use parser::{BoxParseError, ChestBoxParser, ParsedBox, SourceFields, SourceLayout, DEFAULT_LEVEL};
pub use processor::ChestProcessor;
pub use progress::{BuildProgress, ProcessingState, ProgressReporter, StateTracker};
pub use resolver::{similarity, IdentityResolver, Resolution};
pub use segmenter::{ChestBoxSegmenter, SegmentUnderrun, Segmentation, EXPIRED_BOX_WIDTH, OPEN_BOX_WIDTH};
pub use types::{
    ChestBox, OutcomeStats, ParseOutput, ProcessOutcome, ProcessStatus, RewardRecord,
    CONTAINS_MARKER,
};
pub use worker::WorkerPool;

pub use tokio_util::sync::CancellationToken;
