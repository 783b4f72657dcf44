//! Moderation action dispatcher.
//!
//! Performs delete/mute/kick/ban/delete-webhook against Discord and reports the
//! outcome in the guild's log channel. Discord itself sits behind the
//! `ModerationApi` trait so the dispatch rules (timeout, single retry, missing
//! targets treated as done) can be tested without a gateway connection.

pub mod api;
pub mod discord;

#[cfg(test)]
pub(crate) mod mock;

use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use serenity::all::{ChannelId, GuildId, UserId};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::Mutex;

use crate::{
    data::AntiRaidStore,
    error::moderation::ModerationError,
    model::moderation::{
        ActionOutcome, LogEntry, ModerationAction, WebhookInfo, COLOR_ACTION, COLOR_FAILURE,
        MAX_MUTE_DURATION,
    },
    model::settings::canonical_channel_name,
};

pub use api::ModerationApi;
pub use discord::SerenityModerationApi;

/// Delay before the single retry of a transient failure.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Timeout and retry settings for calls against Discord.
#[derive(Debug, Clone, Copy)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub retry_delay: Duration,
}

impl CallPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Runs a Discord call under the timeout, retrying once on transient failure.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T, ModerationError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ModerationError>>,
    {
        match self.attempt(op()).await {
            Err(e) if e.is_transient() => {
                tracing::debug!("Retrying Discord call after transient failure: {}", e);
                tokio::time::sleep(self.retry_delay).await;
                self.attempt(op()).await
            }
            other => other,
        }
    }

    async fn attempt<T>(
        &self,
        fut: impl Future<Output = Result<T, ModerationError>>,
    ) -> Result<T, ModerationError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .unwrap_or(Err(ModerationError::Timeout(self.timeout)))
    }
}

/// Resolved log channel per guild, remembered together with the name it was resolved for.
///
/// Resolution runs under a per-guild async mutex so that concurrent events never
/// create the same log channel twice.
#[derive(Default)]
pub struct LogChannelCache {
    channels: DashMap<GuildId, Arc<Mutex<Option<(String, ChannelId)>>>>,
}

impl LogChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, guild_id: GuildId) -> Arc<Mutex<Option<(String, ChannelId)>>> {
        Arc::clone(&self.channels.entry(guild_id).or_default())
    }
}

pub struct ModerationDispatcher<'a, A: ModerationApi> {
    api: &'a A,
    settings: &'a AntiRaidStore,
    log_channels: &'a LogChannelCache,
    policy: CallPolicy,
}

impl<'a, A: ModerationApi> ModerationDispatcher<'a, A> {
    pub fn new(
        api: &'a A,
        settings: &'a AntiRaidStore,
        log_channels: &'a LogChannelCache,
        policy: CallPolicy,
    ) -> Self {
        Self {
            api,
            settings,
            log_channels,
            policy,
        }
    }

    /// Applies a moderation action and reports it in the guild's log channel.
    ///
    /// # Arguments
    /// - `guild_id` - Guild the action happens in
    /// - `actor_id` - Member the action targets (or the author/creator of the target)
    /// - `action` - What to do
    /// - `reason` - Audit log reason, also shown in the log entry
    ///
    /// # Returns
    /// - `Ok(ActionOutcome::Applied)` - Discord accepted the action
    /// - `Ok(ActionOutcome::AlreadyGone)` - Target no longer exists, nothing to do
    /// - `Err(ModerationError)` - Failed after at most one retry; a failure notice
    ///   was sent to the log channel on a best-effort basis
    pub async fn apply(
        &self,
        guild_id: GuildId,
        actor_id: UserId,
        action: ModerationAction,
        reason: &str,
    ) -> Result<ActionOutcome, ModerationError> {
        let result = self
            .policy
            .run(|| self.perform(guild_id, actor_id, &action, reason))
            .await;

        let outcome = match result {
            Ok(()) => Ok(ActionOutcome::Applied),
            Err(ModerationError::NotFound(_)) if action.tolerates_missing_target() => {
                Ok(ActionOutcome::AlreadyGone)
            }
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(ActionOutcome::Applied) => {
                tracing::info!(
                    "{} for user {} in guild {}: {}",
                    action.label(),
                    actor_id,
                    guild_id,
                    reason
                );
                self.log(guild_id, action_entry(actor_id, &action, reason))
                    .await;
            }
            Ok(ActionOutcome::AlreadyGone) => {
                tracing::debug!(
                    "Skipped {} for user {} in guild {}: target already gone",
                    action.label(),
                    actor_id,
                    guild_id
                );
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to apply {} for user {} in guild {}: {}",
                    action.label(),
                    actor_id,
                    guild_id,
                    e
                );
                self.log(guild_id, failure_entry(actor_id, &action, reason, e))
                    .await;
            }
        }

        outcome
    }

    pub fn bot_id(&self) -> UserId {
        self.api.bot_id()
    }

    /// Lists the webhooks of a channel under the call policy.
    pub async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<WebhookInfo>, ModerationError> {
        self.policy.run(|| self.api.webhooks(channel_id)).await
    }

    /// Sends an entry to the guild's log channel, creating the channel if needed.
    ///
    /// Guilds without saved anti-raid settings have no log channel, so entries
    /// for them are only traced. Failures are logged and swallowed; the log
    /// channel is best effort.
    pub async fn log(&self, guild_id: GuildId, entry: LogEntry) {
        if !self.settings.contains(guild_id).await {
            tracing::debug!(
                "Not logging \"{}\" in guild {} without anti-raid settings",
                entry.title,
                guild_id
            );
            return;
        }

        if let Err(e) = self.try_log(guild_id, &entry).await {
            tracing::warn!(
                "Failed to send \"{}\" to log channel in guild {}: {}",
                entry.title,
                guild_id,
                e
            );
        }
    }

    async fn try_log(&self, guild_id: GuildId, entry: &LogEntry) -> Result<(), ModerationError> {
        let channel_id = self.log_channel(guild_id, false).await?;

        match self.policy.run(|| self.api.send_log(channel_id, entry)).await {
            // Channel was deleted since it was cached; resolve it again once.
            Err(ModerationError::NotFound(_)) => {
                let channel_id = self.log_channel(guild_id, true).await?;
                self.policy.run(|| self.api.send_log(channel_id, entry)).await
            }
            other => other,
        }
    }

    async fn log_channel(
        &self,
        guild_id: GuildId,
        refresh: bool,
    ) -> Result<ChannelId, ModerationError> {
        let name = canonical_channel_name(&self.settings.get(guild_id).await.log_channel);
        let slot = self.log_channels.slot(guild_id);
        let mut cached = slot.lock().await;

        if !refresh {
            if let Some((cached_name, channel_id)) = cached.as_ref() {
                if *cached_name == name {
                    return Ok(*channel_id);
                }
            }
        }

        let channel_id = match self
            .policy
            .run(|| self.api.find_text_channel(guild_id, &name))
            .await?
        {
            Some(channel_id) => channel_id,
            None => {
                tracing::info!("Creating log channel #{} in guild {}", name, guild_id);
                self.policy
                    .run(|| self.api.create_log_channel(guild_id, &name))
                    .await?
            }
        };

        *cached = Some((name, channel_id));
        Ok(channel_id)
    }

    async fn perform(
        &self,
        guild_id: GuildId,
        actor_id: UserId,
        action: &ModerationAction,
        reason: &str,
    ) -> Result<(), ModerationError> {
        match action {
            ModerationAction::DeleteMessage {
                channel_id,
                message_id,
            } => self.api.delete_message(*channel_id, *message_id, reason).await,
            ModerationAction::Mute { duration } => {
                let secs = (*duration).min(MAX_MUTE_DURATION).as_secs() as i64;
                let until = Utc::now() + TimeDelta::seconds(secs);
                self.api
                    .timeout_member(guild_id, actor_id, until, reason)
                    .await
            }
            ModerationAction::Kick => self.api.kick(guild_id, actor_id, reason).await,
            ModerationAction::Ban => self.api.ban(guild_id, actor_id, reason).await,
            ModerationAction::DeleteWebhook { webhook_id } => {
                self.api.delete_webhook(*webhook_id, reason).await
            }
        }
    }
}

fn action_entry(actor_id: UserId, action: &ModerationAction, reason: &str) -> LogEntry {
    let entry = LogEntry::new(action.label(), format!("Target: <@{}>", actor_id), COLOR_ACTION)
        .field("Reason", reason);

    match action {
        ModerationAction::Mute { duration } => {
            entry.field("Duration", format!("{} minute(s)", duration.as_secs() / 60))
        }
        ModerationAction::DeleteMessage { channel_id, .. } => {
            entry.field("Channel", format!("<#{}>", channel_id))
        }
        _ => entry,
    }
}

fn failure_entry(
    actor_id: UserId,
    action: &ModerationAction,
    reason: &str,
    error: &ModerationError,
) -> LogEntry {
    LogEntry::new(
        format!("Could not apply: {}", action.label()),
        format!("Target: <@{}>", actor_id),
        COLOR_FAILURE,
    )
    .field("Reason", reason)
    .field("Error", error.to_string())
}

#[cfg(test)]
mod tests;
