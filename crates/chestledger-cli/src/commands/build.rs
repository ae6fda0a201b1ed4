//! Build command implementation.

use crate::cli::BuildArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use chestledger_processor::{list_cache_files, CancellationToken, ProgressReporter};
use std::io::Write;
use tracing::warn;

/// Execute the build command.
///
/// Ctrl-C stops the build before the next file or chest box; files already
/// merged stay in the ledger.
pub async fn execute_build(args: BuildArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let files = if args.files.is_empty() {
        let dir = args.dir.as_ref().unwrap_or(&config.cache_dir);
        list_cache_files(dir).await?
    } else {
        args.files
    };

    if files.is_empty() {
        println!("{}", formatter.info("No cache files to build from"));
        return Ok(());
    }

    let (reporter, mut rx) = ProgressReporter::channel();
    let (_store, processor) = super::open_processor(config)?;
    let processor = processor.with_progress(reporter);

    let show_progress = !args.quiet;
    let renderer = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            if !show_progress {
                continue;
            }
            let mut stderr = std::io::stderr();
            if progress.finished {
                let _ = writeln!(stderr, "\r{} {:>3.0}%", progress.message, progress.percent());
            } else {
                let _ = write!(stderr, "\r{} {:>3.0}%", progress.message, progress.percent());
            }
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping build");
            on_interrupt.cancel();
        }
    });

    let metrics = processor.build(&files, &cancel).await?;

    // Closes the progress channel
    drop(processor);
    let _ = renderer.await;

    println!("{}", formatter.format_metrics(&metrics)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use chestledger_domain::traits::LedgerStore;
    use chestledger_processor::cache_file_name;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_build_from_cache_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.database = dir.path().join("ledger.db");
        config.cache_dir = dir.path().join("cache");
        config.processor.progress_throttle_ms = 0;

        std::fs::create_dir_all(&config.cache_dir).unwrap();
        std::fs::write(
            config.cache_dir.join(cache_file_name("2026-10-15")),
            "Epic Chest\nFrom: Bob\nSource: Level 10 Crypt\n",
        )
        .unwrap();
        std::fs::write(
            config.cache_dir.join(cache_file_name("2026-10-16")),
            "Rare Chest\nFrom: Bob\nSource: Level 5 Crypt\n",
        )
        .unwrap();

        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let args = BuildArgs {
            files: Vec::new(),
            dir: None,
            quiet: true,
        };
        execute_build(args, &config, &formatter).await.unwrap();

        let store = crate::commands::open_store(&config).unwrap();
        assert_eq!(store.date_keys().unwrap(), vec!["2026-10-15", "2026-10-16"]);
    }
}
