//! Ready event handler for bot initialization.
//!
//! This module handles the `ready` event which is fired when the bot successfully
//! connects to Discord's gateway and completes the initial handshake. The
//! handler logs the connection and registers the slash commands globally.

use serenity::all::{ActivityData, Command, Context, Ready};

use crate::bot::command;

/// Handles the ready event when the bot connects to Discord.
///
/// Registration overwrites the full global command list, so commands removed
/// from the bot disappear from Discord as well.
///
/// # Arguments
/// - `ctx` - Discord context for the HTTP client
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(ctx: Context, ready: Ready) {
    tracing::info!(
        "{} is connected to Discord in {} guild(s)",
        ready.user.name,
        ready.guilds.len()
    );

    ctx.set_activity(Some(ActivityData::watching("for raids")));

    match Command::set_global_commands(&ctx.http, command::definitions()).await {
        Ok(commands) => tracing::info!("Registered {} slash command(s)", commands.len()),
        Err(e) => tracing::error!("Failed to register slash commands: {}", e),
    }
}
