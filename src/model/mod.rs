//! Domain models shared by the data, service and bot layers.
//!
//! - **Settings** (`settings`, `greeting`) - per-guild records persisted as JSON
//! - **Rate** (`rate`) - metrics and verdicts of the rate-window guard
//! - **Moderation** (`moderation`) - actions, outcomes and log entries
//! - **Event** (`event`) - platform events reduced to what the services need

pub mod event;
pub mod greeting;
pub mod moderation;
pub mod rate;
pub mod settings;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::settings::SettingsError;

/// A per-guild settings record stored in its own JSON file.
///
/// The file maps guild ids to records. Records are merged with partial updates
/// (`Patch`) and validated as a whole before being committed, so a rejected
/// write never changes what is stored.
pub trait GuildRecord:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Partial update accepted by `JsonStore::set`.
    type Patch: Send;

    /// File name inside the data directory.
    const FILE_NAME: &'static str;

    /// Checks invariants that the type system does not encode.
    fn validate(&self) -> Result<(), SettingsError>;

    /// Merges `patch` into `self`. Validation happens afterwards in the store.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), SettingsError>;
}
