//! Platform events reduced to the fields the anti-raid service needs.
//!
//! Handlers convert serenity's gateway payloads into these types so that the
//! service layer can be exercised without a gateway connection.

use serenity::all::{ChannelId, GuildId, Member, Message, MessageId, RoleId, UserId};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub guild_id: GuildId,
    pub channel_id: ChannelId,
    pub message_id: MessageId,
    pub author_id: UserId,
    /// Users, roles and `@everyone`/`@here` mentioned by the message.
    pub mention_count: usize,
}

impl MessageEvent {
    /// Builds an event from a gateway message.
    ///
    /// Returns `None` for direct messages and for messages authored by bots,
    /// which are never rate limited.
    pub fn from_message(message: &Message) -> Option<Self> {
        let guild_id = message.guild_id?;
        if message.author.bot {
            return None;
        }

        let mention_count = message.mentions.len()
            + message.mention_roles.len()
            + usize::from(message.mention_everyone);

        Some(Self {
            guild_id,
            channel_id: message.channel_id,
            message_id: message.id,
            author_id: message.author.id,
            mention_count,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinEvent {
    pub guild_id: GuildId,
    pub user_id: UserId,
    pub is_bot: bool,
    /// Unix timestamp of account creation, derived from the user's snowflake.
    pub account_created_at: i64,
}

impl From<&Member> for JoinEvent {
    fn from(member: &Member) -> Self {
        Self {
            guild_id: member.guild_id,
            user_id: member.user.id,
            is_bot: member.user.bot,
            account_created_at: member.user.id.created_at().unix_timestamp(),
        }
    }
}

/// Roles added and removed between two snapshots of a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDelta {
    pub added: Vec<RoleId>,
    pub removed: Vec<RoleId>,
}

impl RoleDelta {
    pub fn between(old: &[RoleId], new: &[RoleId]) -> Self {
        let old_set: HashSet<_> = old.iter().collect();
        let new_set: HashSet<_> = new.iter().collect();

        let mut added: Vec<RoleId> = new.iter().filter(|r| !old_set.contains(r)).copied().collect();
        let mut removed: Vec<RoleId> = old.iter().filter(|r| !new_set.contains(r)).copied().collect();
        added.sort();
        removed.sort();

        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}
