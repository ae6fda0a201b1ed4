//! Core chest processor implementation

use crate::aggregator::{group_by_clanmate, LedgerAggregator};
use crate::cache::{date_from_filename, read_cache, throttle_delay, write_cache};
use crate::clock::{format_date_key, is_valid_date_key, DateSource, SystemClock};
use crate::config::ProcessorConfig;
use crate::error::ProcessorError;
use crate::filter::LineFilter;
use crate::ledger::WorkingLedger;
use crate::parser::{record_box, ChestBoxParser};
use crate::progress::{ProcessingState, ProgressReporter, StateTracker};
use crate::resolver::{IdentityResolver, Resolution};
use crate::segmenter::ChestBoxSegmenter;
use crate::text::contains_ignore_case;
use crate::types::{ChestBox, ParseOutput, ProcessOutcome, ProcessStatus, RewardRecord};
use crate::worker::WorkerPool;
use chestledger_domain::traits::{LedgerStore, RewardsSink, RosterStore};
use chestledger_domain::{ChestData, Clanmate};
use std::collections::HashMap;
use std::fmt::Display;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where the ledger date key of a run comes from
#[derive(Debug, Clone)]
enum DateKeyPolicy {
    /// Read the clock each time a key is needed
    Today,
    /// Key taken from a cache file name
    Fixed(String),
}

pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ProcessorError> {
    mutex
        .lock()
        .map_err(|e| ProcessorError::Lock(format!("{} lock poisoned: {}", what, e)))
}

fn is_no_gifts(lines: &[String]) -> bool {
    lines
        .first()
        .map_or(true, |first| contains_ignore_case(first, "no gifts"))
}

/// Turns captured chest text into ledger entries
///
/// The three collaborators may be the same object: pass clones of one
/// `Arc<Mutex<_>>`. Locks are never held across an `.await` and never
/// nested.
pub struct ChestProcessor<L, R, W> {
    config: ProcessorConfig,
    ledger: Arc<Mutex<L>>,
    roster: Arc<Mutex<R>>,
    rewards: Arc<Mutex<W>>,
    clock: Arc<dyn DateSource>,
    filter: LineFilter,
    segmenter: ChestBoxSegmenter,
    parser: ChestBoxParser,
    resolver: IdentityResolver,
    aggregator: Arc<LedgerAggregator>,
    pool: WorkerPool,
    progress: ProgressReporter,
    state: StateTracker,
}

impl<L, R, W> ChestProcessor<L, R, W>
where
    L: LedgerStore + 'static,
    R: RosterStore + Send + 'static,
    W: RewardsSink + 'static,
    L::Error: Display,
    R::Error: Display,
    W::Error: Display,
{
    /// Create a processor
    ///
    /// Fails when the configuration does not validate.
    pub fn new(
        config: ProcessorConfig,
        ledger: Arc<Mutex<L>>,
        roster: Arc<Mutex<R>>,
        rewards: Arc<Mutex<W>>,
    ) -> Result<Self, ProcessorError> {
        config.validate().map_err(ProcessorError::Config)?;

        Ok(Self {
            filter: LineFilter::new(&config.tags),
            segmenter: ChestBoxSegmenter::new(config.contains_lookahead),
            parser: ChestBoxParser::new(config.locale.clone()),
            resolver: IdentityResolver::new(config.similarity_threshold, config.match_strategy),
            aggregator: Arc::new(LedgerAggregator::new(
                config.chest_options,
                config.scoring_rules.clone(),
            )),
            pool: WorkerPool::new(config.worker_pool_size),
            progress: ProgressReporter::disabled(),
            state: StateTracker::new(),
            clock: Arc::new(SystemClock),
            config,
            ledger,
            roster,
            rewards,
        })
    }

    /// Use a different date source
    pub fn with_clock(mut self, clock: impl DateSource + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Send progress updates to `progress`
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Current processing state
    pub fn state(&self) -> ProcessingState {
        self.state.current()
    }

    /// Observe processing state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<ProcessingState> {
        self.state.subscribe()
    }

    pub(crate) fn progress(&self) -> &ProgressReporter {
        &self.progress
    }

    /// Ledger key for the current date
    pub fn today_key(&self) -> Result<String, ProcessorError> {
        format_date_key(self.clock.today(), &self.config.date_format)
    }

    fn date_key(&self, policy: &DateKeyPolicy) -> Result<String, ProcessorError> {
        match policy {
            DateKeyPolicy::Today => self.today_key(),
            DateKeyPolicy::Fixed(key) => Ok(key.clone()),
        }
    }

    fn roster_members(&self) -> Result<Vec<Clanmate>, ProcessorError> {
        lock(&self.roster, "roster")?
            .members()
            .map_err(|e| ProcessorError::Roster(e.to_string()))
    }

    /// Persisted date keys that do not parse with the configured format
    pub fn validate_date_keys(&self) -> Result<Vec<String>, ProcessorError> {
        let keys = lock(&self.ledger, "ledger")?
            .date_keys()
            .map_err(|e| ProcessorError::Ledger(e.to_string()))?;

        Ok(keys
            .into_iter()
            .filter(|key| !is_valid_date_key(key, &self.config.date_format))
            .collect())
    }

    /// Load or create the working ledger for a date
    ///
    /// An existing entry is loaded and completed with roster members it
    /// lacks. Otherwise one empty record per roster member is seeded and the
    /// date entry is created in the store.
    pub fn init_ledger(&self, date_key: &str) -> Result<WorkingLedger, ProcessorError> {
        let members = self.roster_members()?;
        let existing = lock(&self.ledger, "ledger")?
            .read_entries(date_key)
            .map_err(|e| ProcessorError::Ledger(e.to_string()))?;

        match existing {
            Some(entries) => {
                let ledger = WorkingLedger::from_entries(entries);
                for member in &members {
                    if ledger.get_or_insert(&member.name)?.1 {
                        debug!("Added missing member {} to {}", member.name, date_key);
                    }
                }
                Ok(ledger)
            }
            None => {
                let ledger = WorkingLedger::seeded(&members);
                let entries = ledger.snapshot()?;
                lock(&self.ledger, "ledger")?
                    .create_entry(date_key, &entries)
                    .map_err(|e| ProcessorError::Ledger(e.to_string()))?;
                info!("Created ledger entry for {} with {} member(s)", date_key, entries.len());
                Ok(ledger)
            }
        }
    }

    /// Process a live capture into today's ledger entry
    pub async fn process(&self, lines: &[String]) -> Result<ProcessOutcome, ProcessorError> {
        self.process_with_cancel(lines, &CancellationToken::new()).await
    }

    /// Process a live capture, stopping early when `cancel` fires
    pub async fn process_with_cancel(
        &self,
        lines: &[String],
        cancel: &CancellationToken,
    ) -> Result<ProcessOutcome, ProcessorError> {
        if is_no_gifts(lines) {
            info!("No gifts available");
            self.state.transition(ProcessingState::Idle);
            return Ok(ProcessOutcome::no_gifts());
        }

        self.state.transition(ProcessingState::Processing);

        let filtered = self.filter.filter(lines);
        let warning = filtered.anomaly_message();
        let result = self
            .ingest(filtered.lines, warning, DateKeyPolicy::Today, cancel)
            .await;

        self.settle_state(&result);
        result
    }

    /// Filter a live capture and append it to today's cache file
    pub async fn process_to_cache(
        &self,
        lines: &[String],
        cache_dir: &Path,
    ) -> Result<ProcessOutcome, ProcessorError> {
        if is_no_gifts(lines) {
            info!("No gifts available");
            self.state.transition(ProcessingState::Idle);
            return Ok(ProcessOutcome::no_gifts());
        }

        self.state.transition(ProcessingState::Processing);
        let result = self.cache_capture(lines, cache_dir).await;
        self.settle_state(&result);
        result
    }

    async fn cache_capture(
        &self,
        lines: &[String],
        cache_dir: &Path,
    ) -> Result<ProcessOutcome, ProcessorError> {
        let filtered = self.filter.filter(lines);
        let date_key = self.today_key()?;
        let path = write_cache(cache_dir, &date_key, &filtered.lines).await?;

        let mut outcome = match filtered.anomaly_message() {
            Some(message) => ProcessOutcome::new(ProcessStatus::FilteringError, message),
            None => ProcessOutcome::new(ProcessStatus::Success, "Success"),
        };
        outcome.date_key = Some(date_key);
        outcome.cache_file = Some(path);
        Ok(outcome)
    }

    /// Merge one cache file into the ledger entry named by its file name
    ///
    /// A file whose name does not carry a date in the configured format is
    /// rejected before anything is read or written.
    pub async fn build_from_cache_file(
        &self,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutcome, ProcessorError> {
        let date_key = date_from_filename(path)?;
        if !is_valid_date_key(&date_key, &self.config.date_format) {
            return Err(ProcessorError::InvalidCacheFile(format!(
                "{}: '{}' is not a date in the format '{}'",
                path.display(),
                date_key,
                self.config.date_format
            )));
        }

        let capture = read_cache(path, &self.progress, self.config.progress_throttle()).await?;
        self.ingest(capture.lines, None, DateKeyPolicy::Fixed(capture.date_key), cancel)
            .await
    }

    fn settle_state(&self, result: &Result<ProcessOutcome, ProcessorError>) {
        let state = match result {
            Ok(outcome) if !outcome.status.is_failure() => ProcessingState::Completed,
            _ => ProcessingState::Idle,
        };
        self.state.transition(state);
    }

    /// Segment, parse, resolve, aggregate and persist filtered lines
    async fn ingest(
        &self,
        lines: Vec<String>,
        warning: Option<String>,
        policy: DateKeyPolicy,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutcome, ProcessorError> {
        let segmentation = self.segmenter.segment(&lines);
        let parsed = self.parse_boxes(&segmentation.boxes, cancel).await?;
        self.forward_rewards(&parsed.rewards)?;

        let mut outcome = ProcessOutcome::new(parsed.status, parsed.message);
        outcome.underrun = segmentation.underrun;
        outcome.rewards = parsed.rewards;
        outcome.stats.boxes_parsed = parsed.chest_data.len();

        if parsed.status.is_failure() {
            outcome.chest_data = parsed.chest_data;
            return Ok(outcome);
        }

        let invalid_keys = self.validate_date_keys()?;
        if !invalid_keys.is_empty() {
            warn!("Ledger keys {:?} do not match '{}'", invalid_keys, self.config.date_format);
            outcome.status = ProcessStatus::DataCorrupt;
            outcome.message = format!(
                "Ledger date keys {} do not match the date format '{}'. The ledger needs to be upgraded.",
                invalid_keys.join(", "),
                self.config.date_format
            );
            outcome.chest_data = parsed.chest_data;
            return Ok(outcome);
        }

        let date_key = self.date_key(&policy)?;
        let ledger = Arc::new(self.init_ledger(&date_key)?);

        let (chest_data, corrected, added) =
            self.resolve_identities(parsed.chest_data, &ledger, cancel).await?;
        let points = self.aggregate(&chest_data, &ledger, cancel).await?;

        let entries = ledger.snapshot()?;
        // Read again on purpose: a live run spanning midnight writes to the new date
        let upsert_key = self.date_key(&policy)?;
        lock(&self.ledger, "ledger")?
            .update_entry(&upsert_key, &entries)
            .map_err(|e| ProcessorError::Ledger(e.to_string()))?;

        info!(
            "Merged {} chest(s) into {} ({} corrected, {} new, +{} points)",
            chest_data.len(),
            upsert_key,
            corrected,
            added,
            points
        );

        match warning {
            Some(message) => {
                outcome.status = ProcessStatus::FilteringError;
                outcome.message = message;
            }
            None => {
                outcome.status = ProcessStatus::Success;
                outcome.message = "Success".to_string();
            }
        }
        outcome.date_key = Some(upsert_key);
        outcome.chest_data = chest_data;
        outcome.stats.names_corrected = corrected;
        outcome.stats.members_added = added;
        outcome.stats.points_awarded = points;
        Ok(outcome)
    }

    async fn parse_boxes(
        &self,
        boxes: &[ChestBox],
        cancel: &CancellationToken,
    ) -> Result<ParseOutput, ProcessorError> {
        let mut output = ParseOutput::default();
        let total = boxes.len();

        for (current, chest_box) in boxes.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(ProcessorError::Cancelled);
            }
            self.progress.report(
                format!("Processing chest boxes ({}/{})...", current, total),
                total,
                current,
            );
            if !record_box(&mut output, self.parser.parse_box(chest_box)) {
                break;
            }
            throttle_delay(self.config.progress_throttle()).await;
        }

        Ok(output)
    }

    fn forward_rewards(&self, rewards: &[RewardRecord]) -> Result<(), ProcessorError> {
        if rewards.is_empty() {
            return Ok(());
        }
        let mut sink = lock(&self.rewards, "rewards")?;
        for reward in rewards {
            sink.add_reward(&reward.chest_type, reward.level, &reward.reward)
                .map_err(|e| ProcessorError::Rewards(e.to_string()))?;
        }
        Ok(())
    }

    /// Resolve every distinct parsed name and rewrite chests to canonical names
    async fn resolve_identities(
        &self,
        mut chest_data: Vec<ChestData>,
        ledger: &Arc<WorkingLedger>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ChestData>, usize, usize), ProcessorError> {
        let roster = Arc::new(self.roster_members()?);

        let mut names: Vec<String> = Vec::new();
        for data in &chest_data {
            let key = data.clanmate.to_lowercase();
            if !names.iter().any(|n| n.to_lowercase() == key) {
                names.push(data.clanmate.clone());
            }
        }

        let resolver = self.resolver;
        let resolutions = self
            .pool
            .run(names, cancel, |name| {
                let roster = Arc::clone(&roster);
                let store = Arc::clone(&self.roster);
                let ledger = Arc::clone(ledger);
                async move {
                    let resolution = resolver.resolve(&name, &roster);
                    match &resolution {
                        Resolution::Known(_) => {}
                        Resolution::Corrected { from, to, score } => {
                            info!("{} is actually {} ({:.1}% similar)", from, to, score);
                            ledger.get_or_insert(to)?;
                        }
                        Resolution::New(name) => {
                            warn!("Clanmate {} not found, adding to roster", name);
                            ledger.get_or_insert(name)?;
                            let mut store = lock(&store, "roster")?;
                            store
                                .add_member(name)
                                .map_err(|e| ProcessorError::Roster(e.to_string()))?;
                            store
                                .persist()
                                .map_err(|e| ProcessorError::Roster(e.to_string()))?;
                        }
                    }
                    Ok(resolution)
                }
            })
            .await?;

        let mut corrected = 0;
        let mut added = 0;
        let mut canonical = HashMap::with_capacity(resolutions.len());
        for resolution in &resolutions {
            match resolution {
                Resolution::Corrected { .. } => corrected += 1,
                Resolution::New(_) => added += 1,
                Resolution::Known(_) => {}
            }
            canonical.insert(
                resolution.parsed().to_lowercase(),
                resolution.canonical().to_string(),
            );
        }

        for data in &mut chest_data {
            if let Some(name) = canonical.get(&data.clanmate.to_lowercase()) {
                data.clanmate = name.clone();
            }
        }

        Ok((chest_data, corrected, added))
    }

    /// Append each member's chests to their record, one task per member
    async fn aggregate(
        &self,
        chest_data: &[ChestData],
        ledger: &Arc<WorkingLedger>,
        cancel: &CancellationToken,
    ) -> Result<u64, ProcessorError> {
        let groups = group_by_clanmate(chest_data);

        let added = self
            .pool
            .run(groups, cancel, |group| {
                let ledger = Arc::clone(ledger);
                let aggregator = Arc::clone(&self.aggregator);
                async move {
                    let (entry, _) = ledger.get_or_insert(&group.clanmate)?;
                    let mut record = lock(&entry, "member")?;
                    Ok(u64::from(aggregator.merge(&mut record, &group.chests)))
                }
            })
            .await?;

        Ok(added.iter().sum())
    }
}
