use serenity::all::{Context, GuildId, GuildMemberUpdateEvent, Member, User};

use crate::{
    model::event::{JoinEvent, RoleDelta},
    service::{
        greeting::{Greeting, GreetingContext},
        moderation::SerenityModerationApi,
    },
    state::AppState,
};

/// Handles the guild_member_addition event when a member joins a guild
///
/// Joins are checked by the anti-raid service first. Members removed by it are
/// not welcomed.
pub async fn handle_guild_member_addition(state: &AppState, ctx: Context, new_member: Member) {
    let api = SerenityModerationApi::from_context(&ctx);
    let event = JoinEvent::from(&new_member);

    if state.anti_raid_service(&api).on_join(&event).await.is_some() {
        tracing::debug!("Skipping welcome of {} in guild {}", event.user_id, event.guild_id);
        return;
    }

    greet(state, &ctx, &api, new_member.guild_id, &new_member.user, Greeting::Welcome).await;
}

/// Handles the guild_member_removal event when a member leaves a guild
pub async fn handle_guild_member_removal(
    state: &AppState,
    ctx: Context,
    guild_id: GuildId,
    user: User,
    _member_data_if_available: Option<Member>,
) {
    let api = SerenityModerationApi::from_context(&ctx);
    greet(state, &ctx, &api, guild_id, &user, Greeting::Goodbye).await;
}

/// Handles the guild_member_update event, recording role changes
///
/// The previous roles are only known for cached members; updates of uncached
/// members are skipped.
pub async fn handle_guild_member_update(
    state: &AppState,
    ctx: Context,
    old: Option<Member>,
    _new: Option<Member>,
    event: GuildMemberUpdateEvent,
) {
    let Some(old) = old else {
        tracing::debug!(
            "Member {} updated in guild {} without cached previous state",
            event.user.id,
            event.guild_id
        );
        return;
    };

    let delta = RoleDelta::between(&old.roles, &event.roles);
    if delta.is_empty() {
        return;
    }

    let api = SerenityModerationApi::from_context(&ctx);
    state
        .anti_raid_service(&api)
        .on_roles_changed(event.guild_id, event.user.id, &delta)
        .await;
}

async fn greet(
    state: &AppState,
    ctx: &Context,
    api: &SerenityModerationApi,
    guild_id: GuildId,
    user: &User,
    kind: Greeting,
) {
    let Some((server, member_count)) = guild_summary(ctx, guild_id).await else {
        tracing::warn!("Could not resolve guild {} for {:?} message", guild_id, kind);
        return;
    };

    let greeting = GreetingContext {
        user_id: user.id,
        username: &user.name,
        server: &server,
        member_count,
    };

    if let Err(e) = state
        .greeting_service(api)
        .greet(guild_id, kind, &greeting)
        .await
    {
        tracing::error!(
            "Failed to post {:?} message for {} in guild {}: {}",
            kind,
            user.id,
            guild_id,
            e
        );
    }
}

/// Name and member count of a guild, from the cache or else over HTTP.
async fn guild_summary(ctx: &Context, guild_id: GuildId) -> Option<(String, u64)> {
    // Cache references must not be held across an await
    let cached = ctx
        .cache
        .guild(guild_id)
        .map(|guild| (guild.name.clone(), guild.member_count));
    if cached.is_some() {
        return cached;
    }

    match guild_id.to_partial_guild_with_counts(&ctx.http).await {
        Ok(guild) => Some((guild.name, guild.approximate_member_count.unwrap_or_default())),
        Err(e) => {
            tracing::error!("Failed to fetch guild {}: {}", guild_id, e);
            None
        }
    }
}
