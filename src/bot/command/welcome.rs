//! `/welcome` - configure welcome and goodbye messages.

use serenity::all::{
    ChannelType, CommandOptionType, CreateCommand, CreateCommandOption, GuildId, Permissions,
};

use crate::{
    bot::command::CommandArgs,
    error::AppError,
    model::greeting::{GreetingPatch, GreetingSettings},
    state::AppState,
};

pub const NAME: &str = "welcome";

const PLACEHOLDER_HELP: &str = "Placeholders: {user}, {username}, {server}, {memberCount}";

pub fn definition() -> CreateCommand {
    let template = |name: &str, description: &str| {
        CreateCommandOption::new(CommandOptionType::SubCommand, name, description).add_sub_option(
            CreateCommandOption::new(CommandOptionType::String, "text", PLACEHOLDER_HELP)
                .required(true)
                .max_length(2000),
        )
    };

    CreateCommand::new(NAME)
        .description("Configure welcome and goodbye messages")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "view",
            "Show the current greeting settings",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "channel",
                "Set the channel greetings are posted in",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Channel, "channel", "Text channel")
                    .channel_types(vec![ChannelType::Text])
                    .required(true),
            ),
        )
        .add_option(template("welcome-message", "Set the welcome message"))
        .add_option(template("goodbye-message", "Set the goodbye message"))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "toggle",
                "Turn welcome and goodbye messages on or off",
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "welcome",
                "Post welcome messages",
            ))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "goodbye",
                "Post goodbye messages",
            )),
        )
}

pub async fn run(
    state: &AppState,
    guild_id: GuildId,
    args: &CommandArgs,
) -> Result<String, AppError> {
    let patch = match args.subcommand() {
        "view" => return Ok(describe(&state.greetings.get(guild_id).await)),
        "channel" => GreetingPatch {
            channel_id: args.channel("channel"),
            ..Default::default()
        },
        "welcome-message" => GreetingPatch {
            welcome_message: args.text("text").map(str::to_string),
            ..Default::default()
        },
        "goodbye-message" => GreetingPatch {
            goodbye_message: args.text("text").map(str::to_string),
            ..Default::default()
        },
        "toggle" => GreetingPatch {
            welcome_enabled: args.bool("welcome"),
            goodbye_enabled: args.bool("goodbye"),
            ..Default::default()
        },
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown subcommand `{}`.",
                other
            )))
        }
    };

    let settings = state.greetings.set(guild_id, patch).await?;

    Ok(format!("Greeting settings updated.\n{}", describe(&settings)))
}

fn describe(settings: &GreetingSettings) -> String {
    let channel = settings
        .channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "not set".to_string());

    format!(
        "**Channel**: {}\n**Welcome** ({}): {}\n**Goodbye** ({}): {}",
        channel,
        if settings.welcome_enabled { "on" } else { "off" },
        settings.welcome_message,
        if settings.goodbye_enabled { "on" } else { "off" },
        settings.goodbye_message
    )
}
