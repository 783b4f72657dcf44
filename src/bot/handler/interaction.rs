use serenity::all::{Context, Interaction};

use crate::{bot::command, state::AppState};

/// Handles slash command invocations; other interaction kinds are ignored.
pub async fn handle_interaction_create(state: &AppState, ctx: Context, interaction: Interaction) {
    let Interaction::Command(command) = interaction else {
        return;
    };

    tracing::debug!(
        "/{} invoked by {} in guild {:?}",
        command.data.name,
        command.user.id,
        command.guild_id
    );

    command::handle_command(state, &ctx, &command).await;
}
