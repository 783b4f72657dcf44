use chrono::{DateTime, SecondsFormat, Utc};
use serenity::all::{
    ChannelId, ChannelType, Context, CreateChannel, CreateEmbed, CreateMessage, EditMember,
    GuildId, MessageId, PermissionOverwrite, PermissionOverwriteType, Permissions, Timestamp,
    UserId, WebhookId,
};
use serenity::async_trait;
use serenity::http::Http;
use std::sync::Arc;

use crate::{
    error::moderation::ModerationError,
    model::moderation::{LogEntry, WebhookInfo},
    service::{greeting::TextChannelApi, moderation::ModerationApi},
};

/// `ModerationApi` over serenity's REST client.
pub struct SerenityModerationApi {
    http: Arc<Http>,
    bot_id: UserId,
}

impl SerenityModerationApi {
    pub fn new(http: Arc<Http>, bot_id: UserId) -> Self {
        Self { http, bot_id }
    }

    /// Builds the client from an event context, reading the bot id from the cache.
    pub fn from_context(ctx: &Context) -> Self {
        let bot_id = ctx.cache.current_user().id;
        Self::new(Arc::clone(&ctx.http), bot_id)
    }
}

#[async_trait]
impl ModerationApi for SerenityModerationApi {
    fn bot_id(&self) -> UserId {
        self.bot_id
    }

    async fn delete_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        reason: &str,
    ) -> Result<(), ModerationError> {
        self.http
            .delete_message(channel_id, message_id, Some(reason))
            .await?;
        Ok(())
    }

    async fn timeout_member(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
        reason: &str,
    ) -> Result<(), ModerationError> {
        let edit = EditMember::new()
            .disable_communication_until(until.to_rfc3339_opts(SecondsFormat::Secs, true))
            .audit_log_reason(reason);

        guild_id.edit_member(&self.http, user_id, edit).await?;
        Ok(())
    }

    async fn kick(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), ModerationError> {
        guild_id
            .kick_with_reason(&self.http, user_id, reason)
            .await?;
        Ok(())
    }

    async fn ban(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        reason: &str,
    ) -> Result<(), ModerationError> {
        guild_id
            .ban_with_reason(&self.http, user_id, 0, reason)
            .await?;
        Ok(())
    }

    async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<WebhookInfo>, ModerationError> {
        let webhooks = channel_id.webhooks(&self.http).await?;

        Ok(webhooks
            .into_iter()
            .map(|webhook| WebhookInfo {
                id: webhook.id,
                creator: webhook.user.map(|user| user.id),
            })
            .collect())
    }

    async fn delete_webhook(
        &self,
        webhook_id: WebhookId,
        reason: &str,
    ) -> Result<(), ModerationError> {
        self.http.delete_webhook(webhook_id, Some(reason)).await?;
        Ok(())
    }

    async fn find_text_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, ModerationError> {
        let channels = guild_id.channels(&self.http).await?;

        Ok(channels
            .values()
            .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
            .map(|channel| channel.id))
    }

    async fn create_log_channel(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<ChannelId, ModerationError> {
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(guild_id.everyone_role()),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL
                    | Permissions::SEND_MESSAGES
                    | Permissions::EMBED_LINKS,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(self.bot_id),
            },
        ];

        let channel = guild_id
            .create_channel(
                &self.http,
                CreateChannel::new(name)
                    .kind(ChannelType::Text)
                    .topic("Anti-raid actions and audit events")
                    .permissions(overwrites),
            )
            .await?;

        Ok(channel.id)
    }

    async fn send_log(
        &self,
        channel_id: ChannelId,
        entry: &LogEntry,
    ) -> Result<(), ModerationError> {
        let embed = entry.fields.iter().fold(
            CreateEmbed::new()
                .title(&entry.title)
                .description(&entry.description)
                .color(entry.color)
                .timestamp(Timestamp::now()),
            |embed, (name, value)| embed.field(name, value, false),
        );

        channel_id
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TextChannelApi for SerenityModerationApi {
    async fn send_text(&self, channel_id: ChannelId, content: &str) -> Result<(), ModerationError> {
        channel_id.say(&self.http, content).await?;
        Ok(())
    }
}
