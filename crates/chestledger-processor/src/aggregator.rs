//! Ledger aggregator - appends resolved chests and scores them

use chestledger_domain::{score_chest, Chest, ChestData, ChestOptions, ClanChestData, ScoringRule};
use tracing::debug;

/// Chests of one member in parse order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberChests {
    /// Member name
    pub clanmate: String,
    /// Chests in parse order
    pub chests: Vec<Chest>,
}

/// Group chests by member, case-insensitively
///
/// Groups appear in order of each member's first chest, and chests keep
/// their parse order within a group.
pub fn group_by_clanmate(chest_data: &[ChestData]) -> Vec<MemberChests> {
    let mut groups: Vec<MemberChests> = Vec::new();
    for data in chest_data {
        let key = data.clanmate.to_lowercase();
        match groups.iter_mut().find(|g| g.clanmate.to_lowercase() == key) {
            Some(group) => group.chests.push(data.chest.clone()),
            None => groups.push(MemberChests {
                clanmate: data.clanmate.clone(),
                chests: vec![data.chest.clone()],
            }),
        }
    }
    groups
}

/// Merges a member's chests into their ledger record
#[derive(Debug, Clone, Default)]
pub struct LedgerAggregator {
    options: ChestOptions,
    rules: Vec<ScoringRule>,
}

impl LedgerAggregator {
    /// Create an aggregator
    pub fn new(options: ChestOptions, rules: Vec<ScoringRule>) -> Self {
        Self { options, rules }
    }

    /// Points for one chest, 0 unless point scoring is enabled
    pub fn score(&self, chest: &Chest) -> u32 {
        match self.options {
            ChestOptions::UsePoints => score_chest(&self.rules, chest),
            ChestOptions::CountOnly => 0,
        }
    }

    /// Append chests to the record and return the points added
    pub fn merge(&self, entry: &mut ClanChestData, chests: &[Chest]) -> u32 {
        let mut added = 0u32;
        for chest in chests {
            let points = self.score(chest);
            added = added.saturating_add(points);
            entry.record(chest.clone(), points);
        }
        debug!(
            "Merged {} chest(s) into {} (+{} points, total {})",
            chests.len(),
            entry.clanmate,
            added,
            entry.points
        );
        added
    }
}
