//! `/antiraid` - view and change the guild's anti-raid settings.

use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption, GuildId, Permissions};

use crate::{
    bot::command::CommandArgs,
    error::AppError,
    model::settings::{AntiRaidPatch, AntiRaidSettings},
    state::AppState,
};

pub const NAME: &str = "antiraid";

const LIMIT_OPTIONS: [(&str, &str); 3] = [
    ("join-limit", "Joins allowed per member within 60 seconds"),
    ("message-limit", "Messages allowed per member within 5 seconds"),
    ("mention-limit", "Mentions allowed per member within 5 seconds"),
];

const TOGGLE_OPTIONS: [(&str, &str); 4] = [
    ("auto-ban", "Ban instead of kick on join violations"),
    ("auto-mute", "Time out members who exceed message or mention limits"),
    ("webhook-protection", "Delete webhooks created by non-whitelisted users"),
    ("bot-join-restriction", "Kick bots added to the server"),
];

pub fn definition() -> CreateCommand {
    let limits = LIMIT_OPTIONS.iter().map(|(name, description)| {
        CreateCommandOption::new(CommandOptionType::Integer, *name, *description)
            .min_int_value(1)
            .max_int_value(1000)
    });
    let toggles = TOGGLE_OPTIONS.iter().map(|(name, description)| {
        CreateCommandOption::new(CommandOptionType::Boolean, *name, *description)
    });

    let set = limits
        .chain(toggles)
        .chain([
            CreateCommandOption::new(
                CommandOptionType::Integer,
                "account-age-days",
                "Minimum account age in days for new members, 0 disables",
            )
            .min_int_value(0)
            .max_int_value(3650),
            CreateCommandOption::new(
                CommandOptionType::String,
                "log-channel",
                "Name of the log channel",
            )
            .max_length(100),
        ])
        .fold(
            CreateCommandOption::new(CommandOptionType::SubCommand, "set", "Change settings"),
            |set, option| set.add_sub_option(option),
        );

    let whitelist = |name: &str, description: &str| {
        CreateCommandOption::new(CommandOptionType::SubCommand, name, description).add_sub_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "Member").required(true),
        )
    };

    CreateCommand::new(NAME)
        .description("Configure anti-raid protection")
        .default_member_permissions(Permissions::MANAGE_GUILD)
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "view",
            "Show the current settings",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "enable",
            "Turn anti-raid protection on",
        ))
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "disable",
            "Turn anti-raid protection off",
        ))
        .add_option(set)
        .add_option(whitelist("whitelist-add", "Exempt a member from all checks"))
        .add_option(whitelist("whitelist-remove", "Remove a member from the whitelist"))
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "reset",
            "Restore the default settings",
        ))
}

pub async fn run(
    state: &AppState,
    guild_id: GuildId,
    args: &CommandArgs,
) -> Result<String, AppError> {
    let store = &state.anti_raid;

    match args.subcommand() {
        "view" => {
            let settings = store.get(guild_id).await;
            let mut reply = describe(&settings);
            if !store.contains(guild_id).await {
                reply.push_str("\n*Defaults, nothing saved yet.*");
            }
            Ok(reply)
        }
        "enable" | "disable" => {
            let enabled = args.subcommand() == "enable";
            store
                .set(
                    guild_id,
                    AntiRaidPatch {
                        enabled: Some(enabled),
                        ..Default::default()
                    },
                )
                .await?;
            tracing::info!("Anti-raid {}d in guild {}", args.subcommand(), guild_id);
            Ok(format!("Anti-raid protection {}d.", args.subcommand()))
        }
        "set" => {
            let settings = store.set(guild_id, patch_from_args(args)?).await?;
            Ok(format!("Settings updated.\n{}", describe(&settings)))
        }
        "whitelist-add" => {
            let user_id = args.require_user("user")?;
            store
                .modify(guild_id, |settings| {
                    settings.whitelist.insert(user_id);
                    Ok(())
                })
                .await?;
            Ok(format!("<@{}> is now whitelisted.", user_id))
        }
        "whitelist-remove" => {
            let user_id = args.require_user("user")?;
            if !store.get(guild_id).await.is_whitelisted(user_id) {
                return Err(AppError::BadRequest(format!(
                    "<@{}> is not whitelisted.",
                    user_id
                )));
            }
            store
                .modify(guild_id, |settings| {
                    settings.whitelist.remove(&user_id);
                    Ok(())
                })
                .await?;
            Ok(format!("<@{}> was removed from the whitelist.", user_id))
        }
        "reset" => {
            store.remove(guild_id).await?;
            Ok("Anti-raid settings reset to defaults.".to_string())
        }
        other => Err(AppError::BadRequest(format!(
            "Unknown subcommand `{}`.",
            other
        ))),
    }
}

/// Builds a settings patch from the options of `/antiraid set`.
pub fn patch_from_args(args: &CommandArgs) -> Result<AntiRaidPatch, AppError> {
    let patch = AntiRaidPatch {
        join_limit: args.integer("join-limit"),
        message_limit: args.integer("message-limit"),
        mention_limit: args.integer("mention-limit"),
        account_age_days: args.integer("account-age-days"),
        auto_ban: args.bool("auto-ban"),
        auto_mute: args.bool("auto-mute"),
        webhook_protection: args.bool("webhook-protection"),
        bot_join_restriction: args.bool("bot-join-restriction"),
        log_channel: args.text("log-channel").map(str::to_string),
        ..Default::default()
    };

    if patch.is_empty() {
        return Err(AppError::BadRequest(
            "Provide at least one setting to change.".to_string(),
        ));
    }

    Ok(patch)
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn describe(settings: &AntiRaidSettings) -> String {
    let whitelist = if settings.whitelist.is_empty() {
        "nobody".to_string()
    } else {
        settings
            .whitelist
            .iter()
            .map(|id| format!("<@{}>", id))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let account_age = match settings.account_age_days {
        0 => "off".to_string(),
        days => format!("{} day(s)", days),
    };

    format!(
        "**Anti-raid**: {}\n\
         Join limit: {} per 60s\n\
         Message limit: {} per 5s\n\
         Mention limit: {} per 5s\n\
         Minimum account age: {}\n\
         Auto-ban: {}\n\
         Auto-mute: {}\n\
         Webhook protection: {}\n\
         Bot join restriction: {}\n\
         Log channel: #{}\n\
         Whitelist: {}",
        on_off(settings.enabled),
        settings.join_limit,
        settings.message_limit,
        settings.mention_limit,
        account_age,
        on_off(settings.auto_ban),
        on_off(settings.auto_mute),
        on_off(settings.webhook_protection),
        on_off(settings.bot_join_restriction),
        settings.log_channel,
        whitelist
    )
}
