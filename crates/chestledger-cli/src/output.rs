//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use chestledger_domain::{ClanChestData, Clanmate};
use chestledger_processor::{BatchMetrics, ProcessOutcome};
use chestledger_store::RewardRecord;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the result of processing a capture.
    pub fn format_outcome(&self, outcome: &ProcessOutcome) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let chests: Vec<serde_json::Value> = outcome
                    .chest_data
                    .iter()
                    .map(|d| {
                        serde_json::json!({
                            "clanmate": d.clanmate,
                            "chest": d.chest,
                        })
                    })
                    .collect();
                let rewards: Vec<serde_json::Value> = outcome
                    .rewards
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "type": r.chest_type,
                            "level": r.level,
                            "reward": r.reward,
                        })
                    })
                    .collect();

                let value = serde_json::json!({
                    "status": outcome.status.to_string(),
                    "code": outcome.code(),
                    "message": outcome.message,
                    "date_key": outcome.date_key,
                    "cache_file": outcome.cache_file.as_ref().map(|p| p.display().to_string()),
                    "chests": chests,
                    "rewards": rewards,
                    "stats": {
                        "boxes_parsed": outcome.stats.boxes_parsed,
                        "names_corrected": outcome.stats.names_corrected,
                        "members_added": outcome.stats.members_added,
                        "points_awarded": outcome.stats.points_awarded,
                    }
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(outcome.code().to_string()),
            OutputFormat::Table => {
                let mut out = Vec::new();

                let headline = format!("{} ({}): {}", outcome.status, outcome.code(), outcome.message);
                out.push(if outcome.status.is_failure() {
                    self.error(&headline)
                } else if outcome.status.is_warning() {
                    self.warning(&headline)
                } else {
                    self.success(&headline)
                });

                if let Some(underrun) = &outcome.underrun {
                    out.push(self.warning(&underrun.to_string()));
                }
                if let Some(path) = &outcome.cache_file {
                    out.push(self.info(&format!("Cached to {}", path.display())));
                }

                if !outcome.chest_data.is_empty() {
                    let mut builder = Builder::default();
                    builder.push_record(["Clanmate", "Chest", "Type", "Level"]);
                    for data in &outcome.chest_data {
                        builder.push_record([
                            data.clanmate.clone(),
                            data.chest.name.clone(),
                            data.chest.chest_type.clone(),
                            data.chest.level.to_string(),
                        ]);
                    }
                    out.push(self.table(builder));
                }

                if let Some(date_key) = &outcome.date_key {
                    if outcome.cache_file.is_none() {
                        out.push(self.info(&format!(
                            "{} chest(s) merged into {}: {} name(s) corrected, {} member(s) added, {} point(s)",
                            outcome.chest_data.len(),
                            date_key,
                            outcome.stats.names_corrected,
                            outcome.stats.members_added,
                            outcome.stats.points_awarded
                        )));
                    }
                }

                Ok(out.join("\n"))
            }
        }
    }

    /// Format the member records of one ledger entry.
    pub fn format_ledger(&self, date_key: &str, entries: &[ClanChestData]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "date_key": date_key,
                "entries": entries,
            }))?),
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| format!("{}\t{}\t{}", e.clanmate, e.chests.len(), e.points))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if entries.is_empty() {
                    return Ok(self.colorize(&format!("No members recorded for {}.", date_key), "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Clanmate", "Chests", "Points"]);
                for entry in entries {
                    builder.push_record([
                        entry.clanmate.clone(),
                        entry.chests.len().to_string(),
                        entry.points.to_string(),
                    ]);
                }

                let total: usize = entries.iter().map(|e| e.chests.len()).sum();
                Ok(format!(
                    "{}\n{}",
                    self.table(builder),
                    self.info(&format!("{}: {} chest(s) across {} member(s)", date_key, total, entries.len()))
                ))
            }
        }
    }

    /// Format stored date keys.
    pub fn format_date_keys(&self, keys: &[String]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(keys)?),
            OutputFormat::Quiet => Ok(keys.join("\n")),
            OutputFormat::Table => {
                if keys.is_empty() {
                    return Ok(self.colorize("No ledger entries found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Date"]);
                for (i, key) in keys.iter().enumerate() {
                    builder.push_record([(i + 1).to_string(), key.clone()]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format roster members.
    pub fn format_roster(&self, members: &[Clanmate]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(members)?),
            OutputFormat::Quiet => Ok(members
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if members.is_empty() {
                    return Ok(self.colorize("No clanmates found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Clanmate", "Aliases"]);
                for member in members {
                    let aliases: Vec<&str> = member.aliases.iter().map(String::as_str).collect();
                    builder.push_record([member.name.clone(), aliases.join(", ")]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format reward counts.
    pub fn format_rewards(&self, rewards: &[RewardRecord]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value: Vec<serde_json::Value> = rewards
                    .iter()
                    .map(|r| {
                        serde_json::json!({
                            "type": r.chest_type,
                            "level": r.level,
                            "reward": r.reward,
                            "occurrences": r.occurrences,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(rewards
                .iter()
                .map(|r| format!("{}\t{}\t{}\t{}", r.chest_type, r.level, r.reward, r.occurrences))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rewards.is_empty() {
                    return Ok(self.colorize("No rewards recorded.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Type", "Level", "Reward", "Seen"]);
                for reward in rewards {
                    builder.push_record([
                        reward.chest_type.clone(),
                        reward.level.to_string(),
                        reward.reward.clone(),
                        reward.occurrences.to_string(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format batch build metrics.
    pub fn format_metrics(&self, metrics: &BatchMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let failures: Vec<serde_json::Value> = metrics
                    .failures
                    .iter()
                    .map(|f| serde_json::json!({ "file": f.file, "reason": f.reason }))
                    .collect();
                Ok(serde_json::to_string_pretty(&serde_json::json!({
                    "files_total": metrics.files_total,
                    "files_processed": metrics.files_processed,
                    "files_failed": metrics.files_failed(),
                    "chest_boxes": metrics.chest_boxes,
                    "names_corrected": metrics.names_corrected,
                    "members_added": metrics.members_added,
                    "points_awarded": metrics.points_awarded,
                    "rewards": metrics.rewards,
                    "underruns": metrics.underruns,
                    "cancelled": metrics.cancelled,
                    "elapsed_ms": metrics.elapsed.as_millis() as u64,
                    "failures": failures,
                }))?)
            }
            OutputFormat::Quiet => Ok(format!("{}/{}", metrics.files_processed, metrics.files_total)),
            OutputFormat::Table => {
                let mut out = vec![if metrics.files_failed() > 0 || metrics.cancelled {
                    self.warning(&metrics.summary())
                } else {
                    self.success(&metrics.summary())
                }];
                for failure in &metrics.failures {
                    out.push(self.error(&format!("{}: {}", failure.file, failure.reason)));
                }
                Ok(out.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chestledger_domain::{Chest, ChestData};
    use chestledger_processor::ProcessStatus;

    fn outcome() -> ProcessOutcome {
        let mut outcome = ProcessOutcome::new(ProcessStatus::Success, "Success");
        outcome.date_key = Some("2026-10-17".to_string());
        outcome.chest_data = vec![ChestData::new(
            "Bob",
            Chest::new("Epic Chest", "Crypt", "Level 10 Crypt", 10),
        )];
        outcome
    }

    #[test]
    fn test_outcome_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcome(&outcome()).unwrap();
        assert!(output.starts_with("✓ success (200)"));
        assert!(output.contains("Epic Chest"));
        assert!(output.contains("merged into 2026-10-17"));
    }

    #[test]
    fn test_outcome_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_outcome(&outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["chests"][0]["chest"]["type"], "Crypt");
    }

    #[test]
    fn test_failed_outcome_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let outcome = ProcessOutcome::new(ProcessStatus::ClanmateExtractionError, "bad name");
        assert_eq!(formatter.format_outcome(&outcome).unwrap(), "422");
    }

    #[test]
    fn test_empty_ledger() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_ledger("2026-10-17", &[]).unwrap();
        assert!(output.contains("No members recorded"));
    }

    #[test]
    fn test_ledger_totals() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut bob = ClanChestData::new("Bob");
        bob.record(Chest::new("Epic Chest", "Crypt", "Level 10 Crypt", 10), 5);
        let output = formatter.format_ledger("2026-10-17", &[bob, ClanChestData::new("Alice")]).unwrap();
        assert!(output.contains("Points"));
        assert!(output.contains("1 chest(s) across 2 member(s)"));
    }

    #[test]
    fn test_roster_quiet() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let members = vec![Clanmate::new("Bob"), Clanmate::new("Alice")];
        assert_eq!(formatter.format_roster(&members).unwrap(), "Bob\nAlice");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
