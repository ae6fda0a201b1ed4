//! Rewards command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the rewards command.
pub fn execute_rewards(config: &Config, formatter: &Formatter) -> Result<()> {
    let store = super::open_store(config)?;
    println!("{}", formatter.format_rewards(&store.rewards()?)?);
    Ok(())
}
