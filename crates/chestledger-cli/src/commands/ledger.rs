//! Ledger command implementation.

use crate::cli::LedgerArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use chestledger_domain::traits::LedgerStore;
use chestledger_processor::{format_date_key, DateSource, SystemClock};

/// Execute the ledger command.
pub fn execute_ledger(args: LedgerArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let store = super::open_store(config)?;

    if args.list {
        let keys = store.date_keys()?;
        println!("{}", formatter.format_date_keys(&keys)?);
        return Ok(());
    }

    let date_key = match args.date {
        Some(date) => date,
        None => format_date_key(SystemClock.today(), &config.processor.date_format)?,
    };

    match store.read_entries(&date_key)? {
        Some(entries) => println!("{}", formatter.format_ledger(&date_key, &entries)?),
        None => println!("{}", formatter.warning(&format!("No ledger entry for {}", date_key))),
    }

    Ok(())
}
