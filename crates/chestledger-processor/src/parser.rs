//! Field parser - turns chest boxes into attributed chests
//!
//! Box layout:
//!
//! ```text
//! [0] chest name         "Epic Chest"
//! [1] clanmate           "From: Bob"
//! [2] source and level   "Source: Level 10 Crypt"
//! [3] reward (expired)   "Contains: 500 Gold"
//! ```
//!
//! The level token sits in front of the type in some locales
//! ("Level 10 Crypt") and behind it in others ("Cripta de nivel 10"); see
//! [`SourceLayout`].

use crate::locale::LocaleStrings;
use crate::text::{contains_ignore_case, find_ignore_case, starts_with_ignore_case};
use crate::types::{ChestBox, ParseOutput, ProcessStatus, RewardRecord};
use chestledger_domain::{Chest, ChestData};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Level assumed when a level token is present but its numeral is unreadable
pub const DEFAULT_LEVEL: u32 = 5;

/// Position of the level token relative to the chest type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayout {
    /// Token first, type follows ("Level 10 Crypt")
    Forward,
    /// Type first, token follows ("Cripta de nivel 10")
    Backward,
}

/// Fields extracted from a source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFields {
    /// Text after the source marker
    pub source: String,
    /// Chest type
    pub chest_type: String,
    /// Level, 0 when no level token was found
    pub level: u32,
    /// Layout detected, `None` without a level token
    pub layout: Option<SourceLayout>,
}

/// Why a single box could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoxParseError {
    /// The box is shorter than the field being read
    #[error("chest box has {actual} line(s) but line {index} was required")]
    IndexOutOfRange {
        /// Lines in the box
        actual: usize,
        /// Zero-based line that was missing
        index: usize,
    },

    /// The clanmate line could not be reduced to a name
    #[error("could not extract clanmate name from '{0}'")]
    Clanmate(String),
}

impl BoxParseError {
    /// Status reported for this failure
    pub fn status(&self) -> ProcessStatus {
        match self {
            BoxParseError::IndexOutOfRange { .. } => ProcessStatus::ParseIndexError,
            BoxParseError::Clanmate(_) => ProcessStatus::ClanmateExtractionError,
        }
    }

    /// Message surfaced to automation callers
    pub fn message(&self) -> String {
        match self {
            BoxParseError::IndexOutOfRange { .. } => format!(
                "An error occurred while processing captured text ({}). \
                 A chest name may be missing from the OCR tag list.",
                self
            ),
            BoxParseError::Clanmate(_) => format!("Clanmate name extraction failed: {}", self),
        }
    }
}

/// One successfully parsed box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBox {
    /// The attributed chest
    pub chest_data: ChestData,
    /// Reward carried by an expired chest
    pub reward: Option<RewardRecord>,
}

/// Fold one box result into `output`
///
/// Returns `false` once parsing must stop.
pub(crate) fn record_box(
    output: &mut ParseOutput,
    result: Result<Option<ParsedBox>, BoxParseError>,
) -> bool {
    match result {
        Ok(Some(parsed)) => {
            output.chest_data.push(parsed.chest_data);
            output.rewards.extend(parsed.reward);
            true
        }
        Ok(None) => {
            output.skipped += 1;
            true
        }
        Err(e) => {
            warn!("Stopping chest box parsing: {}", e);
            output.status = e.status();
            output.message = e.message();
            false
        }
    }
}

/// Byte length of the prefix of `s` spanning as many chars as `marker`
fn prefix_len(s: &str, marker: &str) -> usize {
    let count = marker.chars().count();
    s.char_indices().nth(count).map(|(i, _)| i).unwrap_or(s.len())
}

fn is_separator(c: char) -> bool {
    c == ':' || c.is_whitespace()
}

/// Position of `marker` standing as its own word in `s`
fn marker_token_position(s: &str, marker: &str) -> Option<usize> {
    s.char_indices().map(|(i, _)| i).find(|&i| {
        let word_start = s[..i].chars().next_back().map_or(true, char::is_whitespace);
        if !word_start || !starts_with_ignore_case(&s[i..], marker) {
            return false;
        }
        let end = i + prefix_len(&s[i..], marker);
        s[end..].chars().next().map_or(true, is_separator)
    })
}

/// Parses chest boxes using one locale's markers
#[derive(Debug, Clone, Default)]
pub struct ChestBoxParser {
    locale: LocaleStrings,
}

impl ChestBoxParser {
    /// Create a parser for a locale
    pub fn new(locale: LocaleStrings) -> Self {
        Self { locale }
    }

    /// Parse every box, stopping at the first failure
    ///
    /// Chests parsed before the failure are kept in the output.
    pub fn parse(&self, boxes: &[ChestBox]) -> ParseOutput {
        let mut output = ParseOutput::default();
        for chest_box in boxes {
            if !record_box(&mut output, self.parse_box(chest_box)) {
                break;
            }
        }
        output
    }

    /// Parse one box
    ///
    /// Returns `Ok(None)` for a clan header box, which carries no chest.
    pub fn parse_box(&self, chest_box: &ChestBox) -> Result<Option<ParsedBox>, BoxParseError> {
        let lines = chest_box.lines();
        let line = |index: usize| {
            lines.get(index).ok_or(BoxParseError::IndexOutOfRange {
                actual: lines.len(),
                index,
            })
        };

        let name = line(0)?;
        if name.contains(&self.locale.clan) {
            debug!("Skipping clan header box '{}'", name);
            return Ok(None);
        }

        let clanmate_line = line(1)?;
        let source_line = line(2)?;
        let reward_line = if chest_box.has_contains() {
            Some(line(3)?)
        } else {
            None
        };

        debug!("Chest box [{}, {}, {}]", name, clanmate_line, source_line);

        let clanmate = self.extract_clanmate(clanmate_line)?;
        let fields = self.parse_source(source_line);

        let reward = reward_line.map(|line| RewardRecord {
            chest_type: fields.chest_type.clone(),
            level: fields.level,
            reward: extract_reward(line),
        });

        let chest = Chest::new(name.as_str(), fields.chest_type, fields.source, fields.level);
        match &reward {
            Some(r) => info!("Adding {} from {} that contained {}", chest, clanmate, r.reward),
            None => info!("Adding {} from {}", chest, clanmate),
        }

        Ok(Some(ParsedBox {
            chest_data: ChestData::new(clanmate, chest),
            reward,
        }))
    }

    /// Extract the clanmate name from a "From: Name" line
    pub fn extract_clanmate(&self, line: &str) -> Result<String, BoxParseError> {
        let marker = self.locale.from.as_str();

        let mut name = if contains_ignore_case(line, marker) {
            let rest = match line.find(' ') {
                Some(space) => &line[space + 1..],
                None if starts_with_ignore_case(line, marker) => &line[prefix_len(line, marker)..],
                None => line,
            };
            rest.trim_start_matches(is_separator).trim_end().to_string()
        } else {
            line.trim().to_string()
        };

        // OCR occasionally captures the marker twice when the name renders late
        if let Some(pos) = marker_token_position(&name, marker) {
            info!("Attempting to correct clanmate name '{}'", name);
            let end = pos + prefix_len(&name[pos..], marker);
            let tail = name[end..].trim_start_matches(is_separator);
            name = format!("{}{}", &name[..pos], tail).trim().to_string();
            info!("Clanmate name after correction '{}'", name);

            if marker_token_position(&name, marker).is_some() {
                return Err(BoxParseError::Clanmate(line.to_string()));
            }
        }

        if name.is_empty() {
            return Err(BoxParseError::Clanmate(line.to_string()));
        }
        Ok(name)
    }

    /// Extract (source, type, level) from a "Source: ..." line
    pub fn parse_source(&self, line: &str) -> SourceFields {
        let Some(marker_pos) = find_ignore_case(line, &self.locale.source) else {
            return SourceFields {
                source: String::new(),
                chest_type: String::new(),
                level: 0,
                layout: None,
            };
        };

        let after_marker = &line[marker_pos + prefix_len(&line[marker_pos..], &self.locale.source)..];
        let source = match after_marker.find(':') {
            Some(colon) => &after_marker[colon + 1..],
            None => after_marker,
        }
        .trim()
        .to_string();

        let token = [&self.locale.level, &self.locale.lvl]
            .into_iter()
            .find_map(|token| find_ignore_case(&source, token).map(|pos| (pos, token)));

        let Some((token_pos, token)) = token else {
            return SourceFields {
                chest_type: source.clone(),
                source,
                level: 0,
                layout: None,
            };
        };

        let after_token = source[token_pos + prefix_len(&source[token_pos..], token)..].trim_start();
        // The word after the token is the numeral even when OCR garbled it
        let numeral = after_token.split_whitespace().next().unwrap_or("");

        // Ranges ("10-15") keep their first bound
        let level = Some(numeral)
            .filter(|t| t.starts_with(|c: char| c.is_ascii_digit()))
            .and_then(|t| t.split('-').next())
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_LEVEL);

        let (layout, chest_type) = if token_pos == 0 {
            (SourceLayout::Forward, after_token[numeral.len()..].trim())
        } else {
            (SourceLayout::Backward, source[..token_pos].trim())
        };

        SourceFields {
            chest_type: self.qualify_crypt(chest_type),
            level,
            layout: Some(layout),
            source,
        }
    }

    fn qualify_crypt(&self, chest_type: &str) -> String {
        match &self.locale.only_crypt {
            Some(crypt)
                if starts_with_ignore_case(chest_type, crypt)
                    && !starts_with_ignore_case(chest_type, &self.locale.common) =>
            {
                format!("{} {}", self.locale.common, chest_type)
            }
            _ => chest_type.to_string(),
        }
    }
}

/// Reward text after the colon
///
/// Surrounding whitespace is trimmed rather than skipping a fixed two
/// characters, so "Contains:500 Gold" and "Contains:  500 Gold" read the
/// same as the usual "Contains: 500 Gold".
fn extract_reward(line: &str) -> String {
    if !line.contains("Contains") {
        return String::new();
    }
    match line.find(':') {
        Some(colon) => line[colon + 1..].trim().to_string(),
        None => String::new(),
    }
}
