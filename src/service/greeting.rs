//! Welcome and goodbye messages.

use serenity::all::{ChannelId, GuildId, UserId};
use serenity::async_trait;

use crate::{
    data::GreetingStore,
    error::moderation::ModerationError,
    service::moderation::CallPolicy,
};

/// Posting plain messages to a channel.
#[async_trait]
pub trait TextChannelApi: Send + Sync {
    async fn send_text(&self, channel_id: ChannelId, content: &str) -> Result<(), ModerationError>;
}

/// Values substituted into a greeting template.
#[derive(Debug, Clone)]
pub struct GreetingContext<'a> {
    pub user_id: UserId,
    pub username: &'a str,
    pub server: &'a str,
    pub member_count: u64,
}

/// Fills `{user}`, `{username}`, `{server}` and `{memberCount}` in `template`.
///
/// The template is scanned once, so placeholders inside substituted values
/// (a username of `{server}`) stay as they are. Unknown placeholders are kept.
pub fn render(template: &str, ctx: &GreetingContext<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(end) = rest.find('}') {
        let Some(start) = rest[..end].rfind('{') else {
            out.push_str(&rest[..=end]);
            rest = &rest[end + 1..];
            continue;
        };

        out.push_str(&rest[..start]);
        match &rest[start + 1..end] {
            "user" => out.push_str(&format!("<@{}>", ctx.user_id)),
            "username" => out.push_str(ctx.username),
            "server" => out.push_str(ctx.server),
            "memberCount" => out.push_str(&ctx.member_count.to_string()),
            _ => out.push_str(&rest[start..=end]),
        }
        rest = &rest[end + 1..];
    }

    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Welcome,
    Goodbye,
}

pub struct GreetingService<'a, A: TextChannelApi> {
    api: &'a A,
    store: &'a GreetingStore,
    policy: CallPolicy,
}

impl<'a, A: TextChannelApi> GreetingService<'a, A> {
    pub fn new(api: &'a A, store: &'a GreetingStore, policy: CallPolicy) -> Self {
        Self { api, store, policy }
    }

    /// Posts the guild's welcome or goodbye message if it is enabled.
    ///
    /// # Returns
    /// - `Ok(Some(String))` - The rendered message that was posted
    /// - `Ok(None)` - Greeting disabled or no channel configured
    /// - `Err(ModerationError)` - Posting failed
    pub async fn greet(
        &self,
        guild_id: GuildId,
        kind: Greeting,
        ctx: &GreetingContext<'_>,
    ) -> Result<Option<String>, ModerationError> {
        let settings = self.store.get(guild_id).await;

        let (enabled, template) = match kind {
            Greeting::Welcome => (settings.welcome_enabled, &settings.welcome_message),
            Greeting::Goodbye => (settings.goodbye_enabled, &settings.goodbye_message),
        };
        let Some(channel_id) = settings.channel_id.filter(|_| enabled) else {
            return Ok(None);
        };

        let content = render(template, ctx);
        self.policy
            .run(|| self.api.send_text(channel_id, &content))
            .await?;

        tracing::debug!("Posted {:?} message in guild {}", kind, guild_id);

        Ok(Some(content))
    }
}
