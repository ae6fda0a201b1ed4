//! Chestledger Storage Layer
//!
//! Implements the `LedgerStore`, `RosterStore` and `RewardsSink` traits on
//! top of SQLite.
//!
//! # Architecture
//!
//! - `ledger`: one row per date key, entries stored as a JSON array
//! - `clanmates`: roster in registration order, names unique ignoring case
//! - `chest_rewards`: occurrence counts per (type, level, reward)
//!
//! # Examples
//!
//! ```no_run
//! use chestledger_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for ledger, roster and reward operations
//! ```

#![warn(missing_docs)]

use chestledger_domain::traits::{LedgerStore, RewardsSink, RosterStore};
use chestledger_domain::{ClanChestData, Clanmate};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored JSON could not be encoded or decoded
    #[error("Invalid data: {0}")]
    InvalidData(#[from] serde_json::Error),

    /// An entry for the date key already exists
    #[error("Ledger entry already exists for {0}")]
    Duplicate(String),
}

/// Aggregated reward occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRecord {
    /// Chest type the reward came from
    pub chest_type: String,
    /// Chest level
    pub level: u32,
    /// Reward text
    pub reward: String,
    /// Number of times it was seen
    pub occurrences: u32,
}

/// SQLite-based implementation of every collaborator trait
///
/// Roster additions are staged in memory and written by `persist()`;
/// `members()` already reports staged names.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store across tasks
/// behind a `Mutex`.
pub struct SqliteStore {
    conn: Connection,
    pending_members: Vec<String>,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self {
            conn,
            pending_members: Vec::new(),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Aggregated rewards, most frequent first
    pub fn rewards(&self) -> Result<Vec<RewardRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT chest_type, level, reward, occurrences FROM chest_rewards
             ORDER BY occurrences DESC, chest_type, level",
        )?;

        let rewards = stmt
            .query_map([], |row| {
                Ok(RewardRecord {
                    chest_type: row.get(0)?,
                    level: row.get::<_, i64>(1)? as u32,
                    reward: row.get(2)?,
                    occurrences: row.get::<_, i64>(3)? as u32,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rewards)
    }

    fn stored_members(&self) -> Result<Vec<Clanmate>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, aliases FROM clanmates ORDER BY position")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, aliases)| {
                let aliases: BTreeSet<String> = serde_json::from_str(&aliases)?;
                Ok(Clanmate { name, aliases })
            })
            .collect()
    }

    fn entry_exists(&self, date_key: &str) -> Result<bool, StoreError> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM ledger WHERE date_key = ?1",
                params![date_key],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }
}

impl LedgerStore for SqliteStore {
    type Error = StoreError;

    fn date_keys(&self) -> Result<Vec<String>, Self::Error> {
        let mut stmt = self
            .conn
            .prepare("SELECT date_key FROM ledger ORDER BY position")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn read_entries(&self, date_key: &str) -> Result<Option<Vec<ClanChestData>>, Self::Error> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT entries FROM ledger WHERE date_key = ?1",
                params![date_key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn create_entry(&mut self, date_key: &str, entries: &[ClanChestData]) -> Result<(), Self::Error> {
        if self.entry_exists(date_key)? {
            return Err(StoreError::Duplicate(date_key.to_string()));
        }

        let json = serde_json::to_string(entries)?;
        self.conn.execute(
            "INSERT INTO ledger (date_key, entries) VALUES (?1, ?2)",
            params![date_key, json],
        )?;
        Ok(())
    }

    fn update_entry(&mut self, date_key: &str, entries: &[ClanChestData]) -> Result<(), Self::Error> {
        let json = serde_json::to_string(entries)?;
        self.conn.execute(
            "INSERT INTO ledger (date_key, entries) VALUES (?1, ?2)
             ON CONFLICT(date_key) DO UPDATE SET entries = excluded.entries",
            params![date_key, json],
        )?;
        Ok(())
    }
}

impl RosterStore for SqliteStore {
    type Error = StoreError;

    fn members(&self) -> Result<Vec<Clanmate>, Self::Error> {
        let mut members = self.stored_members()?;
        for name in &self.pending_members {
            if !members.iter().any(|m| m.matches_name(name)) {
                members.push(Clanmate::new(name.clone()));
            }
        }
        Ok(members)
    }

    fn add_member(&mut self, name: &str) -> Result<(), Self::Error> {
        let known = self.pending_members.iter().any(|p| p.to_lowercase() == name.to_lowercase())
            || self.stored_members()?.iter().any(|m| m.matches_name(name));
        if !known {
            self.pending_members.push(name.to_string());
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<(), Self::Error> {
        if self.pending_members.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for name in &self.pending_members {
            tx.execute(
                "INSERT OR IGNORE INTO clanmates (name) VALUES (?1)",
                params![name],
            )?;
        }
        tx.commit()?;

        self.pending_members.clear();
        Ok(())
    }
}

impl RewardsSink for SqliteStore {
    type Error = StoreError;

    fn add_reward(&mut self, chest_type: &str, level: u32, reward: &str) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO chest_rewards (chest_type, level, reward, occurrences)
             VALUES (?1, ?2, ?3, 1)
             ON CONFLICT(chest_type, level, reward) DO UPDATE SET
             occurrences = occurrences + 1",
            params![chest_type, level as i64, reward],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_member_visible_before_persist() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store.add_member("Bob").unwrap();

        let members = store.members().unwrap();
        assert_eq!(members.len(), 1);
        assert!(store.stored_members().unwrap().is_empty());

        store.persist().unwrap();
        assert_eq!(store.stored_members().unwrap().len(), 1);
    }

    #[test]
    fn test_add_member_ignores_case_duplicates() {
        let mut store = SqliteStore::new(":memory:").unwrap();
        store.add_member("Bob").unwrap();
        store.add_member("BOB").unwrap();
        store.persist().unwrap();
        store.add_member("bob").unwrap();

        assert_eq!(store.members().unwrap().len(), 1);
    }
}
