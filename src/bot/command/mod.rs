//! Slash commands.
//!
//! Every command is registered globally on `ready`. Options are flattened into
//! `CommandArgs` before a command runs, so command logic works on plain values
//! and can be tested without an interaction payload. Replies are always
//! ephemeral.

pub mod antiraid;
pub mod moderation;
pub mod welcome;

use serenity::all::{
    ChannelId, CommandDataOption, CommandDataOptionValue, CommandInteraction, Context,
    CreateCommand, CreateInteractionResponse, CreateInteractionResponseMessage, GuildId, UserId,
};
use std::collections::HashMap;

use crate::{
    error::{settings::SettingsError, AppError},
    service::moderation::SerenityModerationApi,
    state::AppState,
};

/// Definitions of every command the bot provides.
pub fn definitions() -> Vec<CreateCommand> {
    let mut commands = vec![antiraid::definition(), welcome::definition()];
    commands.extend(moderation::definitions());
    commands
}

/// A single option value of an invoked command.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    User(UserId),
    Channel(ChannelId),
}

/// Options of an invoked command, keyed by option name.
///
/// For commands with subcommands, `subcommand` holds the invoked subcommand
/// and the values are its options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArgs {
    pub subcommand: Option<String>,
    values: HashMap<String, ArgValue>,
}

impl CommandArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: &[CommandDataOption]) -> Self {
        let mut args = Self::new();

        for option in options {
            let value = match &option.value {
                CommandDataOptionValue::SubCommand(nested) => {
                    let nested = Self::from_options(nested);
                    args.subcommand = Some(option.name.clone());
                    args.values = nested.values;
                    continue;
                }
                CommandDataOptionValue::Boolean(v) => ArgValue::Bool(*v),
                CommandDataOptionValue::Integer(v) => ArgValue::Integer(*v),
                CommandDataOptionValue::String(v) => ArgValue::Text(v.clone()),
                CommandDataOptionValue::User(v) => ArgValue::User(*v),
                CommandDataOptionValue::Channel(v) => ArgValue::Channel(*v),
                _ => continue,
            };
            args.values.insert(option.name.clone(), value);
        }

        args
    }

    pub fn with_subcommand(mut self, name: &str) -> Self {
        self.subcommand = Some(name.to_string());
        self
    }

    pub fn with(mut self, name: &str, value: ArgValue) -> Self {
        self.values.insert(name.to_string(), value);
        self
    }

    pub fn subcommand(&self) -> &str {
        self.subcommand.as_deref().unwrap_or_default()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ArgValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<UserId> {
        match self.values.get(name) {
            Some(ArgValue::User(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<ChannelId> {
        match self.values.get(name) {
            Some(ArgValue::Channel(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn require_user(&self, name: &str) -> Result<UserId, AppError> {
        self.user(name)
            .ok_or_else(|| AppError::BadRequest(format!("Missing required option `{}`.", name)))
    }
}

/// Runs an invoked slash command and replies with the outcome.
pub async fn handle_command(state: &AppState, ctx: &Context, command: &CommandInteraction) {
    let reply = match run(state, ctx, command).await {
        Ok(reply) => reply,
        Err(e) => {
            if is_user_error(&e) {
                tracing::debug!("Rejected /{}: {}", command.data.name, e);
            } else {
                tracing::error!("Failed to run /{}: {}", command.data.name, e);
            }
            e.user_message()
        }
    };

    let response = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(reply)
            .ephemeral(true),
    );

    if let Err(e) = command.create_response(&ctx.http, response).await {
        tracing::error!("Failed to respond to /{}: {}", command.data.name, e);
    }
}

fn is_user_error(err: &AppError) -> bool {
    matches!(
        err,
        AppError::BadRequest(_) | AppError::SettingsErr(SettingsError::Validation { .. })
    )
}

async fn run(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<String, AppError> {
    let guild_id: GuildId = command.guild_id.ok_or_else(|| {
        AppError::BadRequest("This command can only be used in a server.".to_string())
    })?;
    let args = CommandArgs::from_options(&command.data.options);

    match command.data.name.as_str() {
        antiraid::NAME => antiraid::run(state, guild_id, &args).await,
        welcome::NAME => welcome::run(state, guild_id, &args).await,
        name => {
            let api = SerenityModerationApi::from_context(ctx);
            moderation::run(state, &api, guild_id, command.user.id, name, &args).await
        }
    }
}
