use serenity::all::{ChannelId, MessageId, UserId, WebhookId};
use std::time::Duration;

/// Default length of an anti-raid timeout.
pub const DEFAULT_MUTE_DURATION: Duration = Duration::from_secs(10 * 60);

/// Longest timeout Discord accepts.
pub const MAX_MUTE_DURATION: Duration = Duration::from_secs(28 * 24 * 60 * 60);

pub const COLOR_ACTION: u32 = 0xe74c3c;
pub const COLOR_FAILURE: u32 = 0xf39c12;
pub const COLOR_AUDIT: u32 = 0x5865f2;

/// A side effect the dispatcher performs against Discord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationAction {
    DeleteMessage {
        channel_id: ChannelId,
        message_id: MessageId,
    },
    Mute {
        duration: Duration,
    },
    Kick,
    Ban,
    DeleteWebhook {
        webhook_id: WebhookId,
    },
}

impl ModerationAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DeleteMessage { .. } => "Message deleted",
            Self::Mute { .. } => "Member muted",
            Self::Kick => "Member kicked",
            Self::Ban => "Member banned",
            Self::DeleteWebhook { .. } => "Webhook deleted",
        }
    }

    /// Whether a missing target means the action's goal is already reached.
    pub fn tolerates_missing_target(&self) -> bool {
        !matches!(self, Self::Mute { .. })
    }
}

/// Successful result of a moderation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    /// Target was already gone; nothing to do.
    AlreadyGone,
}

/// A message for the guild's log channel, rendered as an embed by the Discord adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    pub fn new(title: impl Into<String>, description: impl Into<String>, color: u32) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            color,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }
}

/// A webhook in a channel and the user who created it, if known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookInfo {
    pub id: WebhookId,
    pub creator: Option<UserId>,
}
