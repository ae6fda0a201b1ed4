//! Process command implementation.

use crate::cli::ProcessArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::io::Read;

/// Execute the process command.
pub async fn execute_process(args: ProcessArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = match &args.file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let lines = capture_lines(&text);

    let (_store, processor) = super::open_processor(config)?;
    let outcome = if args.cache {
        processor.process_to_cache(&lines, &config.cache_dir).await?
    } else {
        processor.process(&lines).await?
    };

    println!("{}", formatter.format_outcome(&outcome)?);

    if outcome.status.is_failure() {
        return Err(CliError::Rejected {
            status: outcome.status,
            message: outcome.message,
        });
    }
    Ok(())
}

/// Split captured text into OCR lines, dropping blank ones.
fn capture_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use chestledger_domain::traits::LedgerStore;
    use chestledger_processor::ProcessStatus;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.database = dir.path().join("ledger.db");
        config.cache_dir = dir.path().join("cache");
        config.processor.progress_throttle_ms = 0;
        config
    }

    #[test]
    fn test_capture_lines() {
        let lines = capture_lines("Epic Chest\r\n\r\nFrom: Bob  \n");
        assert_eq!(lines, vec!["Epic Chest", "From: Bob"]);
    }

    #[tokio::test]
    async fn test_process_file_into_ledger() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let capture = dir.path().join("capture.txt");
        std::fs::write(&capture, "Epic Chest\nFrom: Bob\nSource: Level 10 Crypt\n").unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = ProcessArgs {
            file: Some(capture),
            cache: false,
        };
        execute_process(args, &config, &formatter).await.unwrap();

        let store = super::super::open_store(&config).unwrap();
        assert_eq!(store.date_keys().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_capture_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let capture = dir.path().join("capture.txt");
        std::fs::write(&capture, "Epic Chest\nFrom:\nSource: Level 10 Crypt\n").unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = ProcessArgs {
            file: Some(capture),
            cache: false,
        };
        let result = execute_process(args, &config, &formatter).await;
        assert!(matches!(
            result,
            Err(CliError::Rejected {
                status: ProcessStatus::ClanmateExtractionError,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_process_to_cache() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        let capture = dir.path().join("capture.txt");
        std::fs::write(&capture, "Epic Chest\nFrom: Bob\nSource: Level 10 Crypt\n").unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = ProcessArgs {
            file: Some(capture),
            cache: true,
        };
        execute_process(args, &config, &formatter).await.unwrap();

        assert_eq!(std::fs::read_dir(&config.cache_dir).unwrap().count(), 1);
    }
}
