//! Roster module - known clan members

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A known clan member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clanmate {
    /// Canonical name
    pub name: String,

    /// Alternative spellings. Not consulted by identity resolution.
    #[serde(default)]
    pub aliases: BTreeSet<String>,
}

impl Clanmate {
    /// Create a clanmate with no aliases
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: BTreeSet::new(),
        }
    }

    /// Case-insensitive name comparison
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_name_ignores_case() {
        let mate = Clanmate::new("Iroh");
        assert!(mate.matches_name("iroh"));
        assert!(!mate.matches_name("Iro"));
    }
}
