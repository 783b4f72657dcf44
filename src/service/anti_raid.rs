//! Anti-raid orchestration.
//!
//! Turns gateway events into rate-guard checks and moderation actions. Every
//! handler first reads the guild's settings and returns early when anti-raid is
//! disabled or the actor is whitelisted.

use chrono::Utc;
use serenity::all::{ChannelId, GuildId, RoleId, UserId};
use std::time::Instant;

use crate::{
    data::AntiRaidStore,
    model::{
        event::{JoinEvent, MessageEvent, RoleDelta},
        moderation::{LogEntry, ModerationAction, COLOR_AUDIT, DEFAULT_MUTE_DURATION},
        rate::{Metric, WindowVerdict},
        settings::AntiRaidSettings,
    },
    service::{
        moderation::{ModerationApi, ModerationDispatcher},
        rate_guard::RateGuard,
    },
};

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Why an event was acted upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// The actor exceeded the limit of a rate metric.
    RateLimit { metric: Metric, count: usize, limit: u32 },
    /// A bot account joined while bot joins are restricted.
    BotJoin,
    /// The joining account is younger than the configured minimum.
    AccountTooYoung { min_days: u32 },
}

impl Violation {
    fn reason(&self) -> String {
        match self {
            Self::RateLimit {
                metric,
                count,
                limit,
            } => format!(
                "Anti-raid: {} limit exceeded ({} in {}s, limit {})",
                metric.label(),
                count,
                metric.window().as_secs(),
                limit
            ),
            Self::BotJoin => "Anti-raid: bot accounts may not join".to_string(),
            Self::AccountTooYoung { min_days } => {
                format!("Anti-raid: account younger than {} day(s)", min_days)
            }
        }
    }
}

/// Whether an account created at `created_at` is younger than `min_days` at `now`.
///
/// Both timestamps are unix seconds. `min_days == 0` disables the check.
pub fn account_too_young(created_at: i64, now: i64, min_days: u32) -> bool {
    min_days > 0 && now.saturating_sub(created_at) < i64::from(min_days) * SECS_PER_DAY
}

pub struct AntiRaidService<'a, A: ModerationApi> {
    settings: &'a AntiRaidStore,
    guard: &'a RateGuard,
    dispatcher: ModerationDispatcher<'a, A>,
}

impl<'a, A: ModerationApi> AntiRaidService<'a, A> {
    pub fn new(
        settings: &'a AntiRaidStore,
        guard: &'a RateGuard,
        dispatcher: ModerationDispatcher<'a, A>,
    ) -> Self {
        Self {
            settings,
            guard,
            dispatcher,
        }
    }

    /// Checks a new message against the message limit, then its mentions against
    /// the mention limit.
    ///
    /// A violating message is deleted. With `autoMute` the author is also timed
    /// out, once per crossing of the limit rather than for every excess message.
    ///
    /// # Returns
    /// - `Some(Violation)` - The message exceeded a limit and was acted upon
    /// - `None` - Allowed, or anti-raid is off for the guild
    pub async fn on_message(&self, event: &MessageEvent) -> Option<Violation> {
        let settings = self.active_settings(event.guild_id, event.author_id).await?;
        let now = Instant::now();

        let verdict = self
            .guard
            .record_and_check(event.guild_id, event.author_id, Metric::Message, now)
            .await;
        if !verdict.allowed {
            return Some(
                self.enforce_message(event, &settings, Metric::Message, verdict, 1)
                    .await,
            );
        }

        if event.mention_count == 0 {
            return None;
        }

        let verdict = self
            .guard
            .record_events(
                event.guild_id,
                event.author_id,
                Metric::Mention,
                event.mention_count,
                now,
            )
            .await;
        if !verdict.allowed {
            return Some(
                self.enforce_message(
                    event,
                    &settings,
                    Metric::Mention,
                    verdict,
                    event.mention_count,
                )
                .await,
            );
        }

        None
    }

    /// Checks a joining member: bot restriction, then account age, then join rate.
    ///
    /// Bots are kicked; the other violations ban with `autoBan` and kick otherwise.
    pub async fn on_join(&self, event: &JoinEvent) -> Option<Violation> {
        let settings = self.active_settings(event.guild_id, event.user_id).await?;

        let violation = self.join_violation(event, &settings).await?;

        let action = match violation {
            Violation::BotJoin => ModerationAction::Kick,
            _ if settings.auto_ban => ModerationAction::Ban,
            _ => ModerationAction::Kick,
        };

        tracing::info!(
            "Join of user {} in guild {} violates anti-raid settings: {:?}",
            event.user_id,
            event.guild_id,
            violation
        );

        self.enforce(event.guild_id, event.user_id, action, &violation.reason())
            .await;

        Some(violation)
    }

    /// Deletes webhooks in `channel_id` created by anyone other than the bot or a
    /// whitelisted user, when webhook protection is on.
    ///
    /// Webhooks without a known creator are left alone.
    ///
    /// # Returns
    /// - `usize` - Number of webhooks removed
    pub async fn on_webhook_update(&self, guild_id: GuildId, channel_id: ChannelId) -> usize {
        let settings = self.settings.get(guild_id).await;
        if !settings.enabled || !settings.webhook_protection {
            return 0;
        }

        let webhooks = match self.dispatcher.webhooks(channel_id).await {
            Ok(webhooks) => webhooks,
            Err(e) => {
                tracing::warn!(
                    "Failed to list webhooks of channel {} in guild {}: {}",
                    channel_id,
                    guild_id,
                    e
                );
                return 0;
            }
        };

        let bot_id = self.dispatcher.bot_id();
        let mut removed = 0;

        for webhook in webhooks {
            let Some(creator) = webhook.creator else {
                tracing::debug!("Skipping webhook {} without a known creator", webhook.id);
                continue;
            };
            if creator == bot_id || settings.is_whitelisted(creator) {
                continue;
            }

            let action = ModerationAction::DeleteWebhook {
                webhook_id: webhook.id,
            };
            let reason = format!(
                "Anti-raid: webhook created in <#{}> by a non-whitelisted user",
                channel_id
            );
            if self
                .dispatcher
                .apply(guild_id, creator, action, &reason)
                .await
                .is_ok()
            {
                removed += 1;
            }
        }

        removed
    }

    /// Records a role change of a member in the log channel.
    pub async fn on_roles_changed(&self, guild_id: GuildId, user_id: UserId, delta: &RoleDelta) {
        if delta.is_empty() || !self.settings.get(guild_id).await.enabled {
            return;
        }

        let mut entry = LogEntry::new(
            "Member roles changed",
            format!("Member: <@{}>", user_id),
            COLOR_AUDIT,
        );
        if !delta.added.is_empty() {
            entry = entry.field("Added", mention_roles(&delta.added));
        }
        if !delta.removed.is_empty() {
            entry = entry.field("Removed", mention_roles(&delta.removed));
        }

        self.dispatcher.log(guild_id, entry).await;
    }

    /// Records a guild rename in the log channel.
    pub async fn on_guild_renamed(&self, guild_id: GuildId, old_name: &str, new_name: &str) {
        if old_name == new_name || !self.settings.get(guild_id).await.enabled {
            return;
        }

        let entry = LogEntry::new("Server renamed", "The server name was changed", COLOR_AUDIT)
            .field("Before", old_name)
            .field("After", new_name);

        self.dispatcher.log(guild_id, entry).await;
    }

    async fn join_violation(
        &self,
        event: &JoinEvent,
        settings: &AntiRaidSettings,
    ) -> Option<Violation> {
        if event.is_bot && settings.bot_join_restriction {
            return Some(Violation::BotJoin);
        }

        let now = Utc::now().timestamp();
        if account_too_young(event.account_created_at, now, settings.account_age_days) {
            return Some(Violation::AccountTooYoung {
                min_days: settings.account_age_days,
            });
        }

        let verdict = self
            .guard
            .record_and_check(event.guild_id, event.user_id, Metric::Join, Instant::now())
            .await;

        (!verdict.allowed).then_some(Violation::RateLimit {
            metric: Metric::Join,
            count: verdict.count_in_window,
            limit: settings.join_limit,
        })
    }

    /// Settings of the guild if anti-raid applies to `actor_id` there.
    async fn active_settings(
        &self,
        guild_id: GuildId,
        actor_id: UserId,
    ) -> Option<AntiRaidSettings> {
        let settings = self.settings.get(guild_id).await;
        (settings.enabled && !settings.is_whitelisted(actor_id)).then_some(settings)
    }

    async fn enforce_message(
        &self,
        event: &MessageEvent,
        settings: &AntiRaidSettings,
        metric: Metric,
        verdict: WindowVerdict,
        events: usize,
    ) -> Violation {
        let limit = metric.limit(settings);
        let violation = Violation::RateLimit {
            metric,
            count: verdict.count_in_window,
            limit,
        };
        let reason = violation.reason();

        self.enforce(
            event.guild_id,
            event.author_id,
            ModerationAction::DeleteMessage {
                channel_id: event.channel_id,
                message_id: event.message_id,
            },
            &reason,
        )
        .await;

        let first_crossing = verdict.count_in_window.saturating_sub(events) <= limit as usize;
        if settings.auto_mute && first_crossing {
            self.enforce(
                event.guild_id,
                event.author_id,
                ModerationAction::Mute {
                    duration: DEFAULT_MUTE_DURATION,
                },
                &reason,
            )
            .await;
        }

        violation
    }

    /// Applies an anti-raid action. Failures are already reported by the dispatcher.
    async fn enforce(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        action: ModerationAction,
        reason: &str,
    ) {
        let label = action.label();
        if let Err(e) = self.dispatcher.apply(guild_id, user_id, action, reason).await {
            tracing::debug!(
                "Anti-raid action \"{}\" for user {} in guild {} not applied: {}",
                label,
                user_id,
                guild_id,
                e
            );
        }
    }
}

fn mention_roles(roles: &[RoleId]) -> String {
    roles
        .iter()
        .map(|role| format!("<@&{}>", role))
        .collect::<Vec<_>>()
        .join(", ")
}
