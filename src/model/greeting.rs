//! Welcome and goodbye settings, one record per guild.

use serde::{Deserialize, Serialize};
use serenity::all::ChannelId;

use crate::{error::settings::SettingsError, model::GuildRecord};

pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome {user} to **{server}**! You are member #{memberCount}.";
pub const DEFAULT_GOODBYE_MESSAGE: &str = "**{username}** has left {server}.";

/// Discord's message content limit.
const MAX_MESSAGE_LEN: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GreetingSettings {
    pub channel_id: Option<ChannelId>,
    pub welcome_enabled: bool,
    pub goodbye_enabled: bool,
    pub welcome_message: String,
    pub goodbye_message: String,
}

impl Default for GreetingSettings {
    fn default() -> Self {
        Self {
            channel_id: None,
            welcome_enabled: false,
            goodbye_enabled: false,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            goodbye_message: DEFAULT_GOODBYE_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GreetingPatch {
    pub channel_id: Option<ChannelId>,
    pub welcome_enabled: Option<bool>,
    pub goodbye_enabled: Option<bool>,
    pub welcome_message: Option<String>,
    pub goodbye_message: Option<String>,
}

fn check_message(field: &'static str, message: &str) -> Result<(), SettingsError> {
    if message.trim().is_empty() || message.chars().count() > MAX_MESSAGE_LEN {
        return Err(SettingsError::validation(
            field,
            format!("must be 1 to {} characters", MAX_MESSAGE_LEN),
        ));
    }
    Ok(())
}

impl GuildRecord for GreetingSettings {
    type Patch = GreetingPatch;

    const FILE_NAME: &'static str = "welcome.json";

    fn validate(&self) -> Result<(), SettingsError> {
        check_message("welcomeMessage", &self.welcome_message)?;
        check_message("goodbyeMessage", &self.goodbye_message)?;

        if (self.welcome_enabled || self.goodbye_enabled) && self.channel_id.is_none() {
            return Err(SettingsError::validation(
                "channelId",
                "set a greeting channel before enabling messages",
            ));
        }

        Ok(())
    }

    fn apply(&mut self, patch: GreetingPatch) -> Result<(), SettingsError> {
        if let Some(v) = patch.channel_id {
            self.channel_id = Some(v);
        }
        if let Some(v) = patch.welcome_enabled {
            self.welcome_enabled = v;
        }
        if let Some(v) = patch.goodbye_enabled {
            self.goodbye_enabled = v;
        }
        if let Some(v) = patch.welcome_message {
            self.welcome_message = v;
        }
        if let Some(v) = patch.goodbye_message {
            self.goodbye_message = v;
        }
        Ok(())
    }
}
