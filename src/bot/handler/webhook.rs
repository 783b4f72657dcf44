use serenity::all::{ChannelId, Context, GuildId};

use crate::{service::moderation::SerenityModerationApi, state::AppState};

/// Handle a webhook change in a channel
pub async fn handle_webhook_update(
    state: &AppState,
    ctx: Context,
    guild_id: GuildId,
    channel_id: ChannelId,
) {
    let api = SerenityModerationApi::from_context(&ctx);
    let removed = state
        .anti_raid_service(&api)
        .on_webhook_update(guild_id, channel_id)
        .await;

    if removed > 0 {
        tracing::info!(
            "Removed {} unauthorized webhook(s) from channel {} in guild {}",
            removed,
            channel_id,
            guild_id
        );
    }
}
