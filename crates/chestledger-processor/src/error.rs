//! Error types for the chest processor

use thiserror::Error;

/// Errors that can occur while processing captures
///
/// Parsing problems are not errors: they are reported through
/// [`ProcessStatus`](crate::ProcessStatus) on the outcome.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// Ledger store error
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Roster store error
    #[error("Roster error: {0}")]
    Roster(String),

    /// Rewards sink error
    #[error("Rewards error: {0}")]
    Rewards(String),

    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file name does not carry a date token
    #[error("Invalid cache file: {0}")]
    InvalidCacheFile(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A shared lock was poisoned by a panicking worker
    #[error("Lock error: {0}")]
    Lock(String),

    /// Worker task failed to complete
    #[error("Worker error: {0}")]
    Worker(String),

    /// Operation was cancelled
    #[error("Operation cancelled")]
    Cancelled,
}
