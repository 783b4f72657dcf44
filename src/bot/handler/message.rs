use serenity::all::{Context, Message};

use crate::{
    model::event::MessageEvent, service::moderation::SerenityModerationApi, state::AppState,
};

/// Handle message creation in a channel
pub async fn handle_message(state: &AppState, ctx: Context, message: Message) {
    // DMs and bot messages are never rate limited
    let Some(event) = MessageEvent::from_message(&message) else {
        return;
    };

    let api = SerenityModerationApi::from_context(&ctx);
    if let Some(violation) = state.anti_raid_service(&api).on_message(&event).await {
        tracing::info!(
            "Message {} by {} in guild {} violated anti-raid limits: {:?}",
            event.message_id,
            event.author_id,
            event.guild_id,
            violation
        );
    }
}
