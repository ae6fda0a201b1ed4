//! Trait definitions for external collaborators
//!
//! The processing pipeline only reads and writes through these traits.
//! Implementations live in other crates (`chestledger-store`).

use crate::{ClanChestData, Clanmate};

/// Per-date keyed persistence of ledger entries
///
/// Keys are opaque date-formatted strings.
pub trait LedgerStore {
    /// Error type for ledger operations
    type Error;

    /// All date keys, oldest first
    fn date_keys(&self) -> Result<Vec<String>, Self::Error>;

    /// Entries for a date, `None` when the date has no entry yet
    fn read_entries(&self, date_key: &str) -> Result<Option<Vec<ClanChestData>>, Self::Error>;

    /// Create the entry for a date
    fn create_entry(&mut self, date_key: &str, entries: &[ClanChestData]) -> Result<(), Self::Error>;

    /// Replace the entry for a date, creating it when missing
    fn update_entry(&mut self, date_key: &str, entries: &[ClanChestData]) -> Result<(), Self::Error>;
}

/// The list of known clanmates
pub trait RosterStore {
    /// Error type for roster operations
    type Error;

    /// All known members
    fn members(&self) -> Result<Vec<Clanmate>, Self::Error>;

    /// Register a new member
    fn add_member(&mut self, name: &str) -> Result<(), Self::Error>;

    /// Persist pending roster changes
    fn persist(&mut self) -> Result<(), Self::Error>;
}

/// Aggregation of chest rewards seen on expired chests
pub trait RewardsSink {
    /// Error type for reward operations
    type Error;

    /// Record one reward occurrence
    fn add_reward(&mut self, chest_type: &str, level: u32, reward: &str) -> Result<(), Self::Error>;
}
