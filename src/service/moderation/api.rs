use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use serenity::async_trait;

use crate::{
    error::moderation::ModerationError,
    model::moderation::{LogEntry, WebhookInfo},
};

/// The Discord operations moderation needs.
///
/// Every method performs exactly one REST call and classifies failures into
/// `ModerationError`; timeouts and retries are layered on by the dispatcher.
#[async_trait]
pub trait ModerationApi: Send + Sync {
    /// Id of the bot's own user.
    fn bot_id(&self) -> UserId;

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reason: &str,
    ) -> Result<(), ModerationError>;

    /// Times the member out until `until`.
    async fn timeout_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), ModerationError>;

    async fn kick(&self, guild_id: GuildId, user_id: UserId, reason: &str)
        -> Result<(), ModerationError>;

    async fn ban(&self, guild_id: GuildId, user_id: UserId, reason: &str)
        -> Result<(), ModerationError>;

    async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<WebhookInfo>, ModerationError>;

    async fn delete_webhook(&self, webhook_id: WebhookId, reason: &str)
        -> Result<(), ModerationError>;

    /// Looks up a text channel of the guild by exact name.
    async fn find_text_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, ModerationError>;

    /// Creates a private text channel visible to the bot only.
    async fn create_log_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<ChannelId, ModerationError>;

    async fn send_log(&self, channel_id: ChannelId, entry: &LogEntry)
        -> Result<(), ModerationError>;
}
