//! Line filter - drops OCR noise from a capture

use crate::text::contains_ignore_case;
use tracing::warn;

/// Lines kept by the filter plus any anomaly seen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutput {
    /// Lines containing at least one tag, in capture order
    pub lines: Vec<String>,
    /// The last non-empty line that matched no tag and is not a
    /// `contains` line
    pub anomaly: Option<String>,
}

impl FilterOutput {
    /// Warning message for the anomaly, if any
    pub fn anomaly_message(&self) -> Option<String> {
        self.anomaly.as_ref().map(|line| {
            format!(
                "'{}' from the capture doesn't match any OCR tag. Check the spelling of the configured tags.",
                line
            )
        })
    }
}

/// Keeps lines containing a recognized tag
#[derive(Debug, Clone)]
pub struct LineFilter {
    tags: Vec<String>,
}

impl LineFilter {
    /// Create a filter; empty tags are ignored
    pub fn new(tags: &[String]) -> Self {
        Self {
            tags: tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .cloned()
                .collect(),
        }
    }

    /// Whether the line contains any tag (case-insensitive)
    pub fn matches(&self, line: &str) -> bool {
        self.tags.iter().any(|tag| contains_ignore_case(line, tag))
    }

    /// Filter a capture
    pub fn filter(&self, lines: &[String]) -> FilterOutput {
        let mut output = FilterOutput::default();

        for line in lines {
            if self.matches(line) {
                output.lines.push(line.clone());
            } else if !line.trim().is_empty() && !contains_ignore_case(line, "contains") {
                warn!("Unrecognized line in capture: '{}'", line);
                output.anomaly = Some(line.clone());
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> Vec<String> {
        ["Chest", "From", "Source"].iter().map(|s| s.to_string()).collect()
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keeps_tagged_lines_in_order() {
        let filter = LineFilter::new(&tags());
        let output = filter.filter(&lines(&["epic chest", "From: Bob", "Source: Level 10 Crypt"]));
        assert_eq!(output.lines.len(), 3);
        assert!(output.anomaly.is_none());
    }

    #[test]
    fn test_contains_line_dropped_without_anomaly() {
        let filter = LineFilter::new(&tags());
        let output = filter.filter(&lines(&["Epic Chest", "Contains: 500 Gold", ""]));
        assert_eq!(output.lines, lines(&["Epic Chest"]));
        assert!(output.anomaly.is_none());
    }

    #[test]
    fn test_unrecognized_line_flags_anomaly() {
        let filter = LineFilter::new(&tags());
        let output = filter.filter(&lines(&["Epic Chest", "Cobra Totem", "From: Bob"]));
        assert_eq!(output.lines, lines(&["Epic Chest", "From: Bob"]));
        assert_eq!(output.anomaly.as_deref(), Some("Cobra Totem"));
        assert!(output.anomaly_message().unwrap().contains("Cobra Totem"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn output_lines_all_carry_a_tag(raw in prop::collection::vec("[A-Za-z :]{0,20}", 0..20)) {
                let filter = LineFilter::new(&tags());
                let output = filter.filter(&raw);
                for line in &output.lines {
                    prop_assert!(filter.matches(line));
                }
                let expected = raw.iter().filter(|l| filter.matches(l)).count();
                prop_assert_eq!(output.lines.len(), expected);
            }
        }
    }
}
