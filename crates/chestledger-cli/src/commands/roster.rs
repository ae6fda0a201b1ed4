//! Roster command implementation.

use crate::cli::{RosterAction, RosterArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use chestledger_domain::traits::RosterStore;
use chestledger_store::SqliteStore;

/// Execute the roster command.
pub fn execute_roster(args: RosterArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut store = super::open_store(config)?;

    match args.action {
        RosterAction::List => {
            println!("{}", formatter.format_roster(&store.members()?)?);
        }
        RosterAction::Add { names } => {
            let added = add_members(&mut store, &names)?;
            println!("{}", formatter.success(&format!("Added {} clanmate(s)", added)));
        }
    }

    Ok(())
}

/// Add names not yet on the roster and persist them. Returns how many were
/// new.
fn add_members(store: &mut SqliteStore, names: &[String]) -> Result<usize> {
    let before = store.members()?.len();

    for name in names {
        let name = name.trim();
        if name.is_empty() {
            return Err(CliError::InvalidInput("Clanmate name cannot be empty".to_string()));
        }
        store.add_member(name)?;
    }
    store.persist()?;

    Ok(store.members()?.len() - before)
}
