//! Date source for ledger keys

use crate::error::ProcessorError;
use chrono::NaiveDate;
use std::fmt::Write;

/// Supplies "today" for live captures
pub trait DateSource: Send + Sync {
    /// The current local date
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl DateSource for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A fixed date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl DateSource for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Format a date as a ledger key
pub fn format_date_key(date: NaiveDate, format: &str) -> Result<String, ProcessorError> {
    let mut key = String::new();
    write!(key, "{}", date.format(format))
        .map_err(|_| ProcessorError::Config(format!("invalid date format '{}'", format)))?;
    Ok(key)
}

/// Whether a key parses with the given format
pub fn is_valid_date_key(key: &str, format: &str) -> bool {
    NaiveDate::parse_from_str(key, format).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_key() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(format_date_key(date, "%Y-%m-%d").unwrap(), "2026-10-17");
        assert_eq!(format_date_key(date, "%d.%m.%Y").unwrap(), "17.10.2026");
        assert!(format_date_key(date, "%Q").is_err());
    }

    #[test]
    fn test_is_valid_date_key() {
        assert!(is_valid_date_key("2026-10-17", "%Y-%m-%d"));
        assert!(!is_valid_date_key("17/10/2026", "%Y-%m-%d"));
    }

    #[test]
    fn test_fixed_clock() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(FixedClock(date).today(), date);
    }
}
