//! Configuration for the chest processor

use crate::locale::LocaleStrings;
use chestledger_domain::{ChestOptions, ScoringRule};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How an unknown clanmate name is matched against the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Accept the first roster member (in roster order) whose similarity
    /// exceeds the threshold
    #[default]
    FirstOverThreshold,
    /// Accept the most similar roster member above the threshold
    BestMatch,
}

/// How far the segmenter looks for a `Contains:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookaheadScope {
    /// Only the lines the widest box could cover
    #[default]
    Box,
    /// Every remaining line
    Remaining,
}

/// Configuration for the chest processor
///
/// # Examples
///
/// ```
/// use chestledger_processor::ProcessorConfig;
///
/// let config = ProcessorConfig::default();
/// assert_eq!(config.similarity_threshold, 80.0);
///
/// let config = ProcessorConfig::strict();
/// assert_eq!(config.similarity_threshold, 90.0);
///
/// let config = ProcessorConfig::lenient();
/// assert_eq!(config.similarity_threshold, 70.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Substrings a captured line must contain to be kept (case-insensitive)
    pub tags: Vec<String>,

    /// Minimum similarity (0-100) to treat an unknown name as a typo
    /// Default: 80
    pub similarity_threshold: f64,

    /// Roster matching strategy for unknown names
    pub match_strategy: MatchStrategy,

    /// Maximum concurrent resolver/aggregator tasks
    /// Default: 4
    pub worker_pool_size: usize,

    /// Delay between progress events in milliseconds, 0 yields instead
    /// Default: 10
    pub progress_throttle_ms: u64,

    /// strftime format of ledger date keys
    /// Default: "%Y-%m-%d"
    pub date_format: String,

    /// Whether chests are only counted or also scored
    pub chest_options: ChestOptions,

    /// Ordered scoring rules, first match wins
    pub scoring_rules: Vec<ScoringRule>,

    /// `Contains:` lookahead used by the segmenter
    pub contains_lookahead: LookaheadScope,

    /// Localized markers of the captured text
    pub locale: LocaleStrings,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            tags: vec![
                "Chest".to_string(),
                "From".to_string(),
                "Source".to_string(),
                "Contains".to_string(),
            ],
            similarity_threshold: 80.0,
            match_strategy: MatchStrategy::FirstOverThreshold,
            worker_pool_size: 4,
            progress_throttle_ms: 10,
            date_format: "%Y-%m-%d".to_string(),
            chest_options: ChestOptions::CountOnly,
            scoring_rules: Vec::new(),
            contains_lookahead: LookaheadScope::Box,
            locale: LocaleStrings::english(),
        }
    }
}

impl ProcessorConfig {
    /// Strict preset: only near-identical names are merged into a roster member
    pub fn strict() -> Self {
        Self {
            similarity_threshold: 90.0,
            ..Self::default()
        }
    }

    /// Lenient preset: tolerate noisier OCR when matching names
    pub fn lenient() -> Self {
        Self {
            similarity_threshold: 70.0,
            ..Self::default()
        }
    }

    /// Progress throttle as Duration
    pub fn progress_throttle(&self) -> Duration {
        Duration::from_millis(self.progress_throttle_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.tags.iter().all(|t| t.trim().is_empty()) {
            return Err("tags must contain at least one non-empty tag".to_string());
        }
        if !(0.0..=100.0).contains(&self.similarity_threshold) {
            return Err(format!(
                "similarity_threshold must be between 0 and 100, got {}",
                self.similarity_threshold
            ));
        }
        if self.worker_pool_size == 0 {
            return Err("worker_pool_size must be greater than 0".to_string());
        }
        if self.date_format.trim().is_empty() {
            return Err("date_format cannot be empty".to_string());
        }
        // Cache file names carry the date between the last '_' and the last '.'
        if self.date_format.contains(['_', '.']) {
            return Err(format!(
                "date_format '{}' cannot contain '_' or '.'",
                self.date_format
            ));
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(format!("date_format '{}' is not a valid format", self.date_format));
        }
        for rule in &self.scoring_rules {
            rule.level_value()
                .map_err(|e| format!("scoring rule for '{}': {}", rule.chest_type, e))?;
        }
        self.locale.validate()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(ProcessorConfig::default().validate().is_ok());
        assert!(ProcessorConfig::strict().validate().is_ok());
        assert!(ProcessorConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut config = ProcessorConfig::default();
        config.similarity_threshold = 120.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_pool_size() {
        let mut config = ProcessorConfig::default();
        config.worker_pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_tags_rejected() {
        let mut config = ProcessorConfig::default();
        config.tags = vec![String::new()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let mut config = ProcessorConfig::default();
        config.date_format = "%Y-%Q".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_date_format_must_survive_cache_file_names() {
        let mut config = ProcessorConfig::default();
        config.date_format = "%Y_%m_%d".to_string();
        assert!(config.validate().is_err());

        config.date_format = "%d.%m.%Y".to_string();
        assert!(config.validate().is_err());

        config.date_format = "%d-%m-%Y".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_rule_level_rejected() {
        let mut config = ProcessorConfig::default();
        config.scoring_rules = vec![ScoringRule::new("Crypt", "(Any)", "ten", 5)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            similarity_threshold = 75.0
            match_strategy = "best_match"
            chest_options = "use_points"

            [[scoring_rules]]
            chest_type = "Crypt"
            level = "10"
            points = 5
        "#;

        let config = ProcessorConfig::from_toml(toml).unwrap();
        assert_eq!(config.similarity_threshold, 75.0);
        assert_eq!(config.match_strategy, MatchStrategy::BestMatch);
        assert_eq!(config.chest_options, ChestOptions::UsePoints);
        assert_eq!(config.scoring_rules[0].chest_name, "(Any)");
        assert_eq!(config.worker_pool_size, 4);
        assert_eq!(config.locale, LocaleStrings::english());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = ProcessorConfig::lenient();
        config.locale = LocaleStrings::spanish();
        let toml = config.to_toml().unwrap();
        let parsed = ProcessorConfig::from_toml(&toml).unwrap();
        assert_eq!(parsed.similarity_threshold, 70.0);
        assert_eq!(parsed.locale, LocaleStrings::spanish());
    }
}
