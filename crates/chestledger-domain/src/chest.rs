//! Chest module - a single parsed reward-claim event

use serde::{Deserialize, Serialize};
use std::fmt;

/// A chest parsed from one chest box
///
/// Immutable once parsed. `level == 0` means no level indicator was present
/// in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chest {
    /// Display name of the chest (first line of the box)
    pub name: String,

    /// Chest type extracted from the source text (e.g. "Crypt")
    #[serde(rename = "type")]
    pub chest_type: String,

    /// Full source text after the "Source:" marker
    pub source: String,

    /// Level extracted from the source text, 0 when absent
    pub level: u32,
}

impl Chest {
    /// Create a new chest
    pub fn new(
        name: impl Into<String>,
        chest_type: impl Into<String>,
        source: impl Into<String>,
        level: u32,
    ) -> Self {
        Self {
            name: name.into(),
            chest_type: chest_type.into(),
            source: source.into(),
            level,
        }
    }

    /// Whether a level indicator was found for this chest
    pub fn has_level(&self) -> bool {
        self.level > 0
    }
}

impl fmt::Display for Chest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_level() {
            write!(f, "level {} {} '{}'", self.level, self.chest_type, self.name)
        } else {
            write!(f, "{} '{}'", self.chest_type, self.name)
        }
    }
}

/// A chest attributed to a clanmate
///
/// One per parsed chest box. The identity resolver may rewrite `clanmate`
/// to the canonical roster spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChestData {
    /// Clanmate name as extracted (or as corrected)
    pub clanmate: String,

    /// The chest this clanmate sent
    pub chest: Chest,
}

impl ChestData {
    /// Create a new chest attribution
    pub fn new(clanmate: impl Into<String>, chest: Chest) -> Self {
        Self {
            clanmate: clanmate.into(),
            chest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chest_display_with_level() {
        let chest = Chest::new("Epic Chest", "Crypt", "Level 10 Crypt", 10);
        assert_eq!(chest.to_string(), "level 10 Crypt 'Epic Chest'");
    }

    #[test]
    fn test_chest_display_without_level() {
        let chest = Chest::new("Wooden Chest", "Arena", "Arena", 0);
        assert!(!chest.has_level());
        assert_eq!(chest.to_string(), "Arena 'Wooden Chest'");
    }

    #[test]
    fn test_chest_type_serialized_as_type() {
        let chest = Chest::new("Epic Chest", "Crypt", "Level 10 Crypt", 10);
        let json = serde_json::to_string(&chest).unwrap();
        assert!(json.contains("\"type\":\"Crypt\""));
    }
}
