//! File-backed per-guild settings store.
//!
//! Each record type lives in its own JSON file inside the data directory, shaped
//! as `{ "<guildId>": { ... } }`. The whole file is loaded into memory at
//! start-up; every write rewrites the file through a temporary file and an
//! atomic rename, so a crash mid-write never leaves a truncated file behind.

use serenity::all::GuildId;
use std::{
    collections::{BTreeMap, HashMap},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::sync::RwLock;

use crate::{error::settings::SettingsError, model::GuildRecord};

pub struct JsonStore<T: GuildRecord> {
    /// Location of the backing JSON file.
    path: PathBuf,
    /// In-memory copy of every persisted record.
    records: RwLock<HashMap<GuildId, T>>,
}

impl<T: GuildRecord> JsonStore<T> {
    /// Loads the store from `T::FILE_NAME` inside `data_dir`.
    ///
    /// A missing file yields an empty store. Malformed content is reported as
    /// `ConfigCorruption` in the log and recovered from: an unparsable file is
    /// copied to `<file>.corrupt` and replaced by an empty map on the next
    /// write, a single malformed guild entry falls back to defaults.
    ///
    /// # Returns
    /// - `Ok(JsonStore)` - Store populated with every valid record
    /// - `Err(SettingsError::Io)` - The file exists but could not be read
    pub async fn load(data_dir: &Path) -> Result<Self, SettingsError> {
        let path = data_dir.join(T::FILE_NAME);

        let records = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let (records, corruptions) = parse_records::<T>(&path, &contents);
                for corruption in &corruptions {
                    tracing::error!("{}", corruption);
                }
                let file_unreadable = corruptions.iter().any(|c| {
                    matches!(c, SettingsError::ConfigCorruption { guild_id: None, .. })
                });
                if file_unreadable {
                    back_up_corrupt_file(&path).await;
                }
                records
            }
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            "Loaded {} guild record(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    /// Returns the guild's record, or the defaults when none is stored.
    ///
    /// Defaults are not persisted; only explicit writes create a record.
    pub async fn get(&self, guild_id: GuildId) -> T {
        self.records
            .read()
            .await
            .get(&guild_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether a record has been explicitly written for the guild.
    pub async fn contains(&self, guild_id: GuildId) -> bool {
        self.records.read().await.contains_key(&guild_id)
    }

    /// Merges a partial update into the guild's record and persists it.
    ///
    /// # Returns
    /// - `Ok(T)` - The stored record after the merge
    /// - `Err(SettingsError::Validation)` - Rejected; stored record unchanged
    /// - `Err(SettingsError::Io | Json)` - Persisting failed; stored record unchanged
    pub async fn set(&self, guild_id: GuildId, patch: T::Patch) -> Result<T, SettingsError> {
        self.modify(guild_id, |record| record.apply(patch)).await
    }

    /// Applies `change` to a copy of the guild's record, validates it and persists it.
    ///
    /// The write lock is held across the file write, so concurrent updates to the
    /// same store are serialized and never lose each other's changes.
    pub async fn modify<F>(&self, guild_id: GuildId, change: F) -> Result<T, SettingsError>
    where
        F: FnOnce(&mut T) -> Result<(), SettingsError>,
    {
        let mut records = self.records.write().await;

        let mut candidate = records.get(&guild_id).cloned().unwrap_or_default();
        change(&mut candidate)?;
        candidate.validate()?;

        let previous = records.insert(guild_id, candidate.clone());
        if let Err(e) = self.persist(&records).await {
            restore(&mut records, guild_id, previous);
            return Err(e);
        }

        tracing::debug!("Updated {} for guild {}", T::FILE_NAME, guild_id);

        Ok(candidate)
    }

    /// Deletes the guild's record.
    ///
    /// # Returns
    /// - `Ok(true)` - A record existed and was removed
    /// - `Ok(false)` - Nothing was stored for the guild
    pub async fn remove(&self, guild_id: GuildId) -> Result<bool, SettingsError> {
        let mut records = self.records.write().await;

        let Some(previous) = records.remove(&guild_id) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&records).await {
            records.insert(guild_id, previous);
            return Err(e);
        }

        tracing::debug!("Removed {} for guild {}", T::FILE_NAME, guild_id);

        Ok(true)
    }

    async fn persist(&self, records: &HashMap<GuildId, T>) -> Result<(), SettingsError> {
        let ordered: BTreeMap<String, &T> = records
            .iter()
            .map(|(guild_id, record)| (guild_id.get().to_string(), record))
            .collect();
        let contents = serde_json::to_string_pretty(&ordered)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

fn restore<T>(records: &mut HashMap<GuildId, T>, guild_id: GuildId, previous: Option<T>) {
    match previous {
        Some(record) => {
            records.insert(guild_id, record);
        }
        None => {
            records.remove(&guild_id);
        }
    }
}

/// Parses the contents of a settings file.
///
/// Returns every valid record plus one `ConfigCorruption` per problem found.
/// A file-level problem has `guild_id: None` and yields no records.
pub(crate) fn parse_records<T: GuildRecord>(
    path: &Path,
    contents: &str,
) -> (HashMap<GuildId, T>, Vec<SettingsError>) {
    let corruption = |guild_id: Option<&str>, reason: String| SettingsError::ConfigCorruption {
        file: path.to_path_buf(),
        guild_id: guild_id.map(str::to_string),
        reason,
    };

    if contents.trim().is_empty() {
        return (HashMap::new(), Vec::new());
    }

    let raw: BTreeMap<String, serde_json::Value> = match serde_json::from_str(contents) {
        Ok(raw) => raw,
        Err(e) => return (HashMap::new(), vec![corruption(None, e.to_string())]),
    };

    let mut records = HashMap::new();
    let mut corruptions = Vec::new();

    for (key, value) in raw {
        let guild_id = match key.parse::<u64>() {
            Ok(id) if id != 0 => GuildId::new(id),
            _ => {
                corruptions.push(corruption(Some(&key), "key is not a guild id".to_string()));
                continue;
            }
        };

        let record = serde_json::from_value::<T>(value)
            .map_err(|e| e.to_string())
            .and_then(|record| record.validate().map(|_| record).map_err(|e| e.to_string()));

        match record {
            Ok(record) => {
                records.insert(guild_id, record);
            }
            Err(reason) => corruptions.push(corruption(Some(&key), reason)),
        }
    }

    (records, corruptions)
}

async fn back_up_corrupt_file(path: &Path) {
    let backup = path.with_extension("json.corrupt");
    match tokio::fs::copy(path, &backup).await {
        Ok(_) => tracing::warn!(
            "Copied corrupted settings file {} to {}",
            path.display(),
            backup.display()
        ),
        Err(e) => tracing::warn!(
            "Failed to back up corrupted settings file {}: {}",
            path.display(),
            e
        ),
    }
}
