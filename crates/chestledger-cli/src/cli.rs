//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Chestledger - Turn captured chest text into a per-day clan ledger.
#[derive(Debug, Parser)]
#[command(name = "chestledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CHESTLEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database path, overriding the configured one
    #[arg(short, long, global = true, env = "CHESTLEDGER_DB")]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (names and keys only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a capture into today's ledger entry
    Process(ProcessArgs),

    /// Merge cache files into the ledger
    Build(BuildArgs),

    /// Show a ledger entry
    Ledger(LedgerArgs),

    /// Manage the clan roster
    Roster(RosterArgs),

    /// Show reward counts from expired chests
    Rewards,

    /// Show or create the configuration file
    Config(ConfigArgs),
}

/// Arguments for the process command.
#[derive(Debug, Parser)]
pub struct ProcessArgs {
    /// Capture file, one OCR line per line (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Append the filtered capture to today's cache file instead of the ledger
    #[arg(long)]
    pub cache: bool,
}

/// Arguments for the build command.
#[derive(Debug, Parser)]
pub struct BuildArgs {
    /// Cache files to merge (defaults to every cache file in the cache directory)
    pub files: Vec<PathBuf>,

    /// Cache directory to scan
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Hide progress
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the ledger command.
#[derive(Debug, Parser)]
pub struct LedgerArgs {
    /// Date key (defaults to today)
    pub date: Option<String>,

    /// List stored date keys instead
    #[arg(short, long)]
    pub list: bool,
}

/// Arguments for roster management.
#[derive(Debug, Parser)]
pub struct RosterArgs {
    #[command(subcommand)]
    pub action: RosterAction,
}

/// Roster management actions.
#[derive(Debug, Subcommand)]
pub enum RosterAction {
    /// List roster members
    List,

    /// Add members to the roster
    Add {
        /// Member names
        #[arg(required = true)]
        names: Vec<String>,
    },
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the configuration file path
    Path,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_from_stdin() {
        let cli = Cli::parse_from(["chestledger", "process"]);
        match cli.command {
            Command::Process(args) => {
                assert!(args.file.is_none());
                assert!(!args.cache);
            }
            _ => panic!("Expected Process command"),
        }
    }

    #[test]
    fn test_global_database_override() {
        let cli = Cli::parse_from(["chestledger", "ledger", "--list", "--database", "clan.db"]);
        assert_eq!(cli.database, Some(PathBuf::from("clan.db")));
        assert!(matches!(cli.command, Command::Ledger(LedgerArgs { list: true, .. })));
    }

    #[test]
    fn test_roster_add_requires_names() {
        assert!(Cli::try_parse_from(["chestledger", "roster", "add"]).is_err());

        let cli = Cli::parse_from(["chestledger", "roster", "add", "Bob", "Alice"]);
        match cli.command {
            Command::Roster(RosterArgs {
                action: RosterAction::Add { names },
            }) => assert_eq!(names, vec!["Bob", "Alice"]),
            _ => panic!("Expected Roster add"),
        }
    }

    #[test]
    fn test_format_conversion() {
        let format: crate::config::OutputFormat = CliFormat::Json.into();
        assert!(matches!(format, crate::config::OutputFormat::Json));
    }
}
