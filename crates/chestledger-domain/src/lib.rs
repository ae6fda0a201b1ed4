//! Chestledger Domain Layer
//!
//! This crate contains the data model shared by every other crate in the
//! workspace: parsed chests, per-member ledger records, roster members and
//! scoring rules, plus the trait interfaces for the collaborators the
//! processing pipeline talks to.
//!
//! ## Key Concepts
//!
//! - **Chest**: one reward-claim event (name, type, source text, level)
//! - **ChestData**: a chest attributed to the clanmate who sent it
//! - **ClanChestData**: one member's chests and points for a single date
//! - **Scoring rules**: ordered (type, name, level) patterns, first match wins
//!
//! ## Architecture
//!
//! - Pure data and logic only; the only dependency is `serde`
//! - Persistence lives in `chestledger-store`
//! - Trait definitions for the ledger, roster and rewards collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chest;
pub mod ledger;
pub mod roster;
pub mod scoring;
pub mod traits;

// Re-exports for convenience
pub use chest::{Chest, ChestData};
pub use ledger::ClanChestData;
pub use roster::Clanmate;
pub use scoring::{score_chest, ChestOptions, ScoringRule, ANY};
