//! Chestledger CLI library.
//!
//! Configuration, command execution and output formatting for the
//! `chestledger` binary. Every command works against one SQLite database
//! that serves as ledger, roster and rewards store at once.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
