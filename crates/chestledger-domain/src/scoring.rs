//! Scoring module - configurable point values per chest
//!
//! Rules are evaluated in declared order and the first matching rule wins.
//! A later, more specific rule never overrides an earlier general one.

use crate::chest::Chest;
use serde::{Deserialize, Serialize};

/// Wildcard accepted by every field of a scoring rule
pub const ANY: &str = "(Any)";

/// How chests are counted in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChestOptions {
    /// Record chests without awarding points
    #[default]
    CountOnly,
    /// Award points using the configured scoring rules
    UsePoints,
}

/// A (type, name, level) pattern mapped to a point value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRule {
    /// Substring matched against the chest type (case-insensitive), or `(Any)`
    pub chest_type: String,

    /// Exact chest name (case-insensitive), or `(Any)`
    #[serde(default = "any")]
    pub chest_name: String,

    /// Level numeral, or `(Any)`
    #[serde(default = "any")]
    pub level: String,

    /// Points awarded when the rule matches
    pub points: u32,
}

fn any() -> String {
    ANY.to_string()
}

fn is_any(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(ANY)
}

impl ScoringRule {
    /// Create a rule
    pub fn new(
        chest_type: impl Into<String>,
        chest_name: impl Into<String>,
        level: impl Into<String>,
        points: u32,
    ) -> Self {
        Self {
            chest_type: chest_type.into(),
            chest_name: chest_name.into(),
            level: level.into(),
            points,
        }
    }

    /// Parsed level, `None` for the wildcard
    ///
    /// Returns `Err` when the level is neither `(Any)` nor an integer.
    pub fn level_value(&self) -> Result<Option<u32>, String> {
        if is_any(&self.level) {
            return Ok(None);
        }
        self.level
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| format!("Invalid rule level '{}'", self.level))
    }

    /// Whether this rule applies to the chest
    pub fn matches(&self, chest: &Chest) -> bool {
        let type_matches = is_any(&self.chest_type)
            || chest
                .chest_type
                .to_lowercase()
                .contains(&self.chest_type.to_lowercase());
        if !type_matches {
            return false;
        }

        let name_matches =
            is_any(&self.chest_name) || chest.name.to_lowercase() == self.chest_name.to_lowercase();
        if !name_matches {
            return false;
        }

        match self.level_value() {
            Ok(None) => true,
            Ok(Some(level)) => level == chest.level,
            Err(_) => false,
        }
    }
}

/// First rule matching the chest
pub fn first_match<'a>(rules: &'a [ScoringRule], chest: &Chest) -> Option<&'a ScoringRule> {
    rules.iter().find(|rule| rule.matches(chest))
}

/// Points awarded for a chest; zero when no rule matches
pub fn score_chest(rules: &[ScoringRule], chest: &Chest) -> u32 {
    first_match(rules, chest).map(|rule| rule.points).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gold(level: u32) -> Chest {
        Chest::new("Gold Chest", "Gold", format!("Level {} Gold", level), level)
    }

    #[test]
    fn test_first_match_wins_over_more_specific_rule() {
        let rules = vec![
            ScoringRule::new("Gold", ANY, ANY, 10),
            ScoringRule::new("Gold", ANY, "5", 20),
        ];
        assert_eq!(score_chest(&rules, &gold(5)), 10);
    }

    #[test]
    fn test_type_is_case_insensitive_substring() {
        let rules = vec![ScoringRule::new("crypt", ANY, ANY, 3)];
        let chest = Chest::new("Epic Chest", "Common Crypt", "Common Crypt", 0);
        assert_eq!(score_chest(&rules, &chest), 3);
    }

    #[test]
    fn test_name_must_match_exactly() {
        let rules = vec![ScoringRule::new("Gold", "gold chest", ANY, 7)];
        assert_eq!(score_chest(&rules, &gold(1)), 7);

        let rules = vec![ScoringRule::new("Gold", "Gold", ANY, 7)];
        assert_eq!(score_chest(&rules, &gold(1)), 0);
    }

    #[test]
    fn test_level_must_match_numerically() {
        let rules = vec![
            ScoringRule::new("Gold", ANY, "10", 50),
            ScoringRule::new("Gold", ANY, "05", 5),
        ];
        assert_eq!(score_chest(&rules, &gold(10)), 50);
        assert_eq!(score_chest(&rules, &gold(5)), 5);
        assert_eq!(score_chest(&rules, &gold(15)), 0);
    }

    #[test]
    fn test_any_type_wildcard() {
        let rules = vec![ScoringRule::new(ANY, ANY, ANY, 1)];
        let chest = Chest::new("Whatever", "Arena", "Arena", 0);
        assert_eq!(score_chest(&rules, &chest), 1);
    }

    #[test]
    fn test_invalid_level_never_matches() {
        let rule = ScoringRule::new("Gold", ANY, "ten", 1);
        assert!(rule.level_value().is_err());
        assert!(!rule.matches(&gold(10)));
    }

    #[test]
    fn test_no_rules_scores_zero() {
        assert_eq!(score_chest(&[], &gold(5)), 0);
    }

    #[test]
    fn test_rule_defaults_from_json() {
        let rule: ScoringRule = serde_json::from_str(r#"{"chest_type":"Gold","points":4}"#).unwrap();
        assert_eq!(rule.chest_name, ANY);
        assert_eq!(rule.level, ANY);
    }
}
