//! Command implementations.

pub mod build;
pub mod config;
pub mod ledger;
pub mod process;
pub mod rewards;
pub mod roster;

pub use self::build::execute_build;
pub use self::config::execute_config;
pub use self::ledger::execute_ledger;
pub use self::process::execute_process;
pub use self::rewards::execute_rewards;
pub use self::roster::execute_roster;

use crate::config::Config;
use crate::error::Result;
use chestledger_processor::ChestProcessor;
use chestledger_store::SqliteStore;
use std::sync::{Arc, Mutex};

/// One SQLite store serving as ledger, roster and rewards sink
pub type SharedStore = Arc<Mutex<SqliteStore>>;

/// Processor wired to a single SQLite store
pub type StoreProcessor = ChestProcessor<SqliteStore, SqliteStore, SqliteStore>;

/// Open the configured database, creating its directory when missing.
pub fn open_store(config: &Config) -> Result<SqliteStore> {
    if let Some(parent) = config.database.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(SqliteStore::new(&config.database)?)
}

/// Build a processor over the configured database.
pub fn open_processor(config: &Config) -> Result<(SharedStore, StoreProcessor)> {
    let store = Arc::new(Mutex::new(open_store(config)?));
    let processor = ChestProcessor::new(
        config.processor.clone(),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
    )?;
    Ok((store, processor))
}
