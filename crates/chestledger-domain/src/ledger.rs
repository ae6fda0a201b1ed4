//! Ledger module - per-member records for a single date

use crate::chest::Chest;
use serde::{Deserialize, Deserializer, Serialize};

/// One clanmate's chests and points for one date
///
/// Created when a member first appears for a date (seeded from the roster
/// or discovered while parsing). Chests are only ever appended; entries are
/// never deleted within a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanChestData {
    /// Clanmate name (canonical roster spelling)
    pub clanmate: String,

    /// Chests in parse order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub chests: Vec<Chest>,

    /// Accumulated points
    #[serde(default)]
    pub points: u32,
}

impl ClanChestData {
    /// Create an empty record for a clanmate
    pub fn new(clanmate: impl Into<String>) -> Self {
        Self {
            clanmate: clanmate.into(),
            chests: Vec::new(),
            points: 0,
        }
    }

    /// Case-insensitive comparison against a clanmate name
    pub fn is_for(&self, name: &str) -> bool {
        self.clanmate.to_lowercase() == name.to_lowercase()
    }

    /// Append a chest and add its point value to the running total
    pub fn record(&mut self, chest: Chest, points: u32) {
        self.chests.push(chest);
        self.points = self.points.saturating_add(points);
    }
}

/// Older ledgers persisted members that never sent a chest with `null` chests
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Chest>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Chest>>::deserialize(deserializer)?.unwrap_or_default())
}
