//! Error types for the CLI application.

use chestledger_processor::{ProcessStatus, ProcessorError};
use chestledger_store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Processor error
    #[error("Processor error: {0}")]
    Processor(#[from] ProcessorError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The capture was not merged
    #[error("{message} (status {})", .status.code())]
    Rejected {
        /// Outcome classification
        status: ProcessStatus,
        /// Message from the processor
        message: String,
    },
}
