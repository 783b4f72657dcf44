use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, validating or persisting per-guild settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A settings write was rejected because a value is out of range.
    ///
    /// The stored record is left untouched when this error is returned.
    #[error("Invalid setting `{field}`: {reason}")]
    Validation {
        /// Name of the offending field as it appears in the JSON file
        field: &'static str,
        /// Human-readable explanation shown to the command invoker
        reason: String,
    },

    /// Persisted settings could not be parsed.
    ///
    /// Recovered locally by falling back to defaults; never fatal to the process.
    #[error("Corrupted settings in {} (guild {}): {reason}", file.display(), guild_id.as_deref().unwrap_or("*"))]
    ConfigCorruption {
        /// The settings file that failed to load
        file: PathBuf,
        /// Guild key of the corrupt entry, or `None` when the whole file is unreadable
        guild_id: Option<String>,
        /// Underlying parse failure
        reason: String,
    },

    /// Filesystem error while persisting settings.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization error, including patches carrying unknown fields.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SettingsError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}
