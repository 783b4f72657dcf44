use serenity::all::{Context, Guild, PartialGuild};

use crate::{service::moderation::SerenityModerationApi, state::AppState};

/// Handles the guild_update event, recording renames in the log channel.
///
/// The previous name is only known when the guild was cached, so renames of
/// uncached guilds go unrecorded.
pub async fn handle_guild_update(
    state: &AppState,
    ctx: Context,
    old: Option<Guild>,
    new: PartialGuild,
) {
    let Some(old) = old else {
        tracing::debug!("Guild {} updated without cached previous state", new.id);
        return;
    };

    let api = SerenityModerationApi::from_context(&ctx);
    state
        .anti_raid_service(&api)
        .on_guild_renamed(new.id, &old.name, &new.name)
        .await;
}
