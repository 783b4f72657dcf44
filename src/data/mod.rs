//! Persistence layer for per-guild settings.
//!
//! Settings are stored as JSON files in the data directory, one file per record
//! type. `JsonStore` handles loading, validation on write and atomic persistence;
//! the aliases below name the stores the bot uses.

pub mod json_store;

use crate::model::{greeting::GreetingSettings, settings::AntiRaidSettings};

pub use json_store::JsonStore;

/// Anti-raid settings persisted in `anti_raid.json`.
pub type AntiRaidStore = JsonStore<AntiRaidSettings>;

/// Welcome/goodbye settings persisted in `welcome.json`.
pub type GreetingStore = JsonStore<GreetingSettings>;

#[cfg(test)]
mod test;
