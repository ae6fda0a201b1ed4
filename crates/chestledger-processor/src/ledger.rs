//! Working ledger - the per-date member records being merged
//!
//! Each member record sits behind its own lock so concurrent workers
//! serialize per member. The member list itself is guarded separately and
//! only held while looking up or inserting a record.

use crate::error::ProcessorError;
use chestledger_domain::{ClanChestData, Clanmate};
use std::sync::{Arc, Mutex, RwLock};

/// Shared handle to one member's record
pub type MemberEntry = Arc<Mutex<ClanChestData>>;

/// Per-date member records under merge
#[derive(Debug, Default)]
pub struct WorkingLedger {
    entries: RwLock<Vec<(String, MemberEntry)>>,
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

fn lock_error<E: std::fmt::Display>(e: E) -> ProcessorError {
    ProcessorError::Lock(e.to_string())
}

impl WorkingLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger holding existing records
    pub fn from_entries(entries: Vec<ClanChestData>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (key(&entry.clanmate), Arc::new(Mutex::new(entry))))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Ledger with one empty record per roster member
    pub fn seeded(roster: &[Clanmate]) -> Self {
        let mut entries: Vec<ClanChestData> = Vec::with_capacity(roster.len());
        for member in roster {
            if !entries.iter().any(|e| e.is_for(&member.name)) {
                entries.push(ClanChestData::new(member.name.clone()));
            }
        }
        Self::from_entries(entries)
    }

    /// Record for a member, matched case-insensitively
    pub fn find(&self, name: &str) -> Result<Option<MemberEntry>, ProcessorError> {
        let key = key(name);
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, entry)| Arc::clone(entry)))
    }

    /// Record for a member, appending an empty one when missing
    ///
    /// The flag is `true` when a record was created.
    pub fn get_or_insert(&self, name: &str) -> Result<(MemberEntry, bool), ProcessorError> {
        if let Some(entry) = self.find(name)? {
            return Ok((entry, false));
        }

        let key = key(name);
        let mut entries = self.entries.write().map_err(lock_error)?;
        // Another worker may have inserted it between the two locks
        if let Some((_, entry)) = entries.iter().find(|(k, _)| *k == key) {
            return Ok((Arc::clone(entry), false));
        }

        let entry = Arc::new(Mutex::new(ClanChestData::new(name)));
        entries.push((key, Arc::clone(&entry)));
        Ok((entry, true))
    }

    /// Number of member records
    pub fn len(&self) -> Result<usize, ProcessorError> {
        Ok(self.entries.read().map_err(lock_error)?.len())
    }

    /// Whether the ledger has no records
    pub fn is_empty(&self) -> Result<bool, ProcessorError> {
        Ok(self.len()? == 0)
    }

    /// Copy of every record in insertion order
    pub fn snapshot(&self) -> Result<Vec<ClanChestData>, ProcessorError> {
        let entries = self.entries.read().map_err(lock_error)?;
        entries
            .iter()
            .map(|(_, entry)| entry.lock().map(|e| e.clone()).map_err(lock_error))
            .collect()
    }
}
