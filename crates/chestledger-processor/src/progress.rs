//! Progress events and processing state
//!
//! Progress is pushed through an unbounded channel so emitting never blocks
//! the pipeline. Processing state is published through a watch channel and
//! only changes are observed.

use tokio::sync::{mpsc, watch};

/// One progress update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProgress {
    /// What is being worked on
    pub message: String,
    /// Units of work in this step
    pub total: usize,
    /// Units completed
    pub current: usize,
    /// Whether the whole operation is done
    pub finished: bool,
}

impl BuildProgress {
    /// Create a progress update
    pub fn new(message: impl Into<String>, total: usize, current: usize, finished: bool) -> Self {
        Self {
            message: message.into(),
            total,
            current,
            finished,
        }
    }

    /// Completion percentage, 0 when the total is unknown
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64 * 100.0
        }
    }
}

/// Sender side of progress updates
///
/// A disabled reporter (the default) discards everything. Updates sent
/// after the receiver is dropped are discarded too.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::UnboundedSender<BuildProgress>>,
}

impl ProgressReporter {
    /// Reporter plus the receiver to render from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BuildProgress>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Reporter that discards updates
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Push an update
    pub fn send(&self, progress: BuildProgress) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(progress);
        }
    }

    /// Push an in-flight update
    pub fn report(&self, message: impl Into<String>, total: usize, current: usize) {
        self.send(BuildProgress::new(message, total, current, false));
    }

    /// Push the final update
    pub fn finish(&self, message: impl Into<String>, total: usize, current: usize) {
        self.send(BuildProgress::new(message, total, current, true));
    }
}

/// Lifecycle of a live capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingState {
    /// Waiting for a capture
    #[default]
    Idle,
    /// A capture is being processed
    Processing,
    /// The last capture was merged
    Completed,
}

/// Publishes processing state transitions
#[derive(Debug)]
pub struct StateTracker {
    tx: watch::Sender<ProcessingState>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    /// Tracker starting in `Idle`
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProcessingState::Idle);
        Self { tx }
    }

    /// Observe transitions
    pub fn subscribe(&self) -> watch::Receiver<ProcessingState> {
        self.tx.subscribe()
    }

    /// Current state
    pub fn current(&self) -> ProcessingState {
        *self.tx.borrow()
    }

    /// Move to `state`; returns `false` when already there
    pub fn transition(&self, state: ProcessingState) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == state {
                return false;
            }
            tracing::debug!("Processing state {:?} -> {:?}", current, state);
            *current = state;
            true
        })
    }
}
