//! Anti-raid settings, one record per guild.

use serde::{Deserialize, Serialize};
use serenity::all::UserId;
use std::collections::BTreeSet;

use crate::{error::settings::SettingsError, model::GuildRecord};

pub const DEFAULT_JOIN_LIMIT: u32 = 5;
pub const DEFAULT_MESSAGE_LIMIT: u32 = 5;
pub const DEFAULT_MENTION_LIMIT: u32 = 5;
pub const DEFAULT_LOG_CHANNEL: &str = "anti-raid-logs";

const MAX_LIMIT: u32 = 1000;
const MAX_ACCOUNT_AGE_DAYS: u32 = 3650;
const MAX_CHANNEL_NAME_LEN: usize = 100;

/// Anti-raid configuration of a single guild.
///
/// Serialized with camelCase keys into `anti_raid.json`. Unknown keys are
/// rejected so that typos in a hand-edited file surface as corruption instead
/// of silently falling back to defaults for that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct AntiRaidSettings {
    /// Master switch for all anti-raid handlers in the guild.
    pub enabled: bool,
    /// Joins allowed per actor within the join window.
    pub join_limit: u32,
    /// Messages allowed per actor within the message window.
    pub message_limit: u32,
    /// Mentions allowed per actor within the message window.
    pub mention_limit: u32,
    /// Minimum account age for joining members, `0` disables the check.
    pub account_age_days: u32,
    /// Ban instead of kick for join-side violations.
    pub auto_ban: bool,
    /// Time out members that exceed the message or mention limit.
    pub auto_mute: bool,
    /// Delete webhooks created by non-whitelisted users.
    pub webhook_protection: bool,
    /// Kick bot accounts added to the guild.
    pub bot_join_restriction: bool,
    /// Name of the text channel receiving moderation logs.
    pub log_channel: String,
    /// Users exempt from every check.
    pub whitelist: BTreeSet<UserId>,
}

impl Default for AntiRaidSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            join_limit: DEFAULT_JOIN_LIMIT,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            mention_limit: DEFAULT_MENTION_LIMIT,
            account_age_days: 0,
            auto_ban: false,
            auto_mute: true,
            webhook_protection: false,
            bot_join_restriction: false,
            log_channel: DEFAULT_LOG_CHANNEL.to_string(),
            whitelist: BTreeSet::new(),
        }
    }
}

impl AntiRaidSettings {
    pub fn is_whitelisted(&self, user_id: UserId) -> bool {
        self.whitelist.contains(&user_id)
    }
}

/// Partial update of `AntiRaidSettings`.
///
/// Limits are signed so that zero and negative values coming from a command or
/// a JSON payload reach validation and are rejected with a clear message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AntiRaidPatch {
    pub enabled: Option<bool>,
    pub join_limit: Option<i64>,
    pub message_limit: Option<i64>,
    pub mention_limit: Option<i64>,
    pub account_age_days: Option<i64>,
    pub auto_ban: Option<bool>,
    pub auto_mute: Option<bool>,
    pub webhook_protection: Option<bool>,
    pub bot_join_restriction: Option<bool>,
    pub log_channel: Option<String>,
    pub whitelist: Option<BTreeSet<UserId>>,
}

impl AntiRaidPatch {
    pub fn is_empty(&self) -> bool {
        self.enabled.is_none()
            && self.join_limit.is_none()
            && self.message_limit.is_none()
            && self.mention_limit.is_none()
            && self.account_age_days.is_none()
            && self.auto_ban.is_none()
            && self.auto_mute.is_none()
            && self.webhook_protection.is_none()
            && self.bot_join_restriction.is_none()
            && self.log_channel.is_none()
            && self.whitelist.is_none()
    }
}

/// Puts a channel name into the form Discord stores text channel names in.
///
/// Discord lowercases text channel names and joins words with `-`, so a
/// configured `#Raid Logs` is created, and must be looked up, as `raid-logs`.
pub fn canonical_channel_name(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('#')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn limit(field: &'static str, value: i64) -> Result<u32, SettingsError> {
    u32::try_from(value)
        .ok()
        .filter(|v| (1..=MAX_LIMIT).contains(v))
        .ok_or_else(|| {
            SettingsError::validation(field, format!("must be between 1 and {}", MAX_LIMIT))
        })
}

fn check_limit(field: &'static str, value: u32) -> Result<(), SettingsError> {
    limit(field, i64::from(value)).map(|_| ())
}

impl GuildRecord for AntiRaidSettings {
    type Patch = AntiRaidPatch;

    const FILE_NAME: &'static str = "anti_raid.json";

    fn validate(&self) -> Result<(), SettingsError> {
        check_limit("joinLimit", self.join_limit)?;
        check_limit("messageLimit", self.message_limit)?;
        check_limit("mentionLimit", self.mention_limit)?;

        if self.account_age_days > MAX_ACCOUNT_AGE_DAYS {
            return Err(SettingsError::validation(
                "accountAgeDays",
                format!("must be between 0 and {}", MAX_ACCOUNT_AGE_DAYS),
            ));
        }

        let name = self.log_channel.trim();
        if name.is_empty() || name.chars().count() > MAX_CHANNEL_NAME_LEN {
            return Err(SettingsError::validation(
                "logChannel",
                format!("must be 1 to {} characters", MAX_CHANNEL_NAME_LEN),
            ));
        }

        Ok(())
    }

    fn apply(&mut self, patch: AntiRaidPatch) -> Result<(), SettingsError> {
        if let Some(v) = patch.enabled {
            self.enabled = v;
        }
        if let Some(v) = patch.join_limit {
            self.join_limit = limit("joinLimit", v)?;
        }
        if let Some(v) = patch.message_limit {
            self.message_limit = limit("messageLimit", v)?;
        }
        if let Some(v) = patch.mention_limit {
            self.mention_limit = limit("mentionLimit", v)?;
        }
        if let Some(v) = patch.account_age_days {
            self.account_age_days = u32::try_from(v)
                .map_err(|_| SettingsError::validation("accountAgeDays", "must not be negative"))?;
        }
        if let Some(v) = patch.auto_ban {
            self.auto_ban = v;
        }
        if let Some(v) = patch.auto_mute {
            self.auto_mute = v;
        }
        if let Some(v) = patch.webhook_protection {
            self.webhook_protection = v;
        }
        if let Some(v) = patch.bot_join_restriction {
            self.bot_join_restriction = v;
        }
        if let Some(v) = patch.log_channel {
            self.log_channel = canonical_channel_name(&v);
        }
        if let Some(v) = patch.whitelist {
            self.whitelist = v;
        }

        Ok(())
    }
}
