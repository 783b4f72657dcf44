use std::{path::PathBuf, time::Duration};

use crate::error::{config::ConfigError, AppError};

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 10;

pub struct Config {
    pub discord_bot_token: String,

    /// Directory holding the per-guild JSON settings files.
    pub data_dir: PathBuf,

    /// Upper bound for a single moderation call against Discord.
    pub action_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            discord_bot_token: std::env::var("DISCORD_BOT_TOKEN")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_BOT_TOKEN".to_string()))?,
            data_dir: std::env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
            action_timeout: Duration::from_secs(parse_secs(
                "ACTION_TIMEOUT_SECS",
                std::env::var("ACTION_TIMEOUT_SECS").ok(),
                DEFAULT_ACTION_TIMEOUT_SECS,
            )?),
        })
    }
}

/// Parses an optional positive number of seconds, falling back to `default` when unset.
fn parse_secs(name: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidEnvVar {
            name: name.to_string(),
            value: raw,
        }),
    }
}
