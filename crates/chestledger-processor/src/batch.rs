//! Batch driver - merges a series of cache files into the ledger

use crate::error::ProcessorError;
use crate::metrics::BatchMetrics;
use crate::processor::ChestProcessor;
use chestledger_domain::traits::{LedgerStore, RewardsSink, RosterStore};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

impl<L, R, W> ChestProcessor<L, R, W>
where
    L: LedgerStore + 'static,
    R: RosterStore + Send + 'static,
    W: RewardsSink + 'static,
    L::Error: Display,
    R::Error: Display,
    W::Error: Display,
{
    /// Merge cache files in order, each into the date named by its file
    ///
    /// A file that fails is logged, counted and skipped. Cancellation stops
    /// before the next file or record; what was already persisted stays.
    pub async fn build(
        &self,
        files: &[PathBuf],
        cancel: &CancellationToken,
    ) -> Result<BatchMetrics, ProcessorError> {
        let started = Instant::now();
        let total = files.len();
        let mut metrics = BatchMetrics::new(total);

        info!("Building ledger from {} cache file(s)", total);

        for (current, file) in files.iter().enumerate() {
            if cancel.is_cancelled() {
                metrics.cancelled = true;
                break;
            }

            let name = file.display().to_string();
            match self.build_from_cache_file(file, cancel).await {
                Ok(outcome) if BatchMetrics::is_skipped(outcome.status) => {
                    error!("Skipping {}: {}", name, outcome.message);
                    self.progress().report(outcome.message.clone(), total, current);
                    metrics.record_failure(name, outcome.message);
                }
                Ok(outcome) => {
                    info!(
                        "Merged {} into {} ({})",
                        name,
                        outcome.date_key.as_deref().unwrap_or("?"),
                        outcome.status
                    );
                    metrics.record_outcome(&outcome);
                }
                Err(ProcessorError::Cancelled) => {
                    warn!("Batch cancelled while processing {}", name);
                    metrics.cancelled = true;
                    break;
                }
                Err(e) => {
                    error!("Skipping {}: {}", name, e);
                    self.progress().report(e.to_string(), total, current);
                    metrics.record_failure(name, e.to_string());
                }
            }
        }

        metrics.elapsed = started.elapsed();
        self.progress()
            .finish("Finished building clan chests...", total, metrics.files_seen());
        info!("{}", metrics.summary());

        Ok(metrics)
    }
}
