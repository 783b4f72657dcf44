//! `/kick`, `/ban` and `/mute`, routed through the moderation dispatcher so that
//! manual actions get the same timeout, retry and log channel entry as
//! automatic ones.

use serenity::all::{
    CommandOptionType, CreateCommand, CreateCommandOption, GuildId, Permissions, UserId,
};
use std::time::Duration;

use crate::{
    bot::command::CommandArgs,
    error::AppError,
    model::moderation::{
        ActionOutcome, ModerationAction, DEFAULT_MUTE_DURATION, MAX_MUTE_DURATION,
    },
    service::moderation::ModerationApi,
    state::AppState,
};

pub const KICK: &str = "kick";
pub const BAN: &str = "ban";
pub const MUTE: &str = "mute";

const MAX_MUTE_MINUTES: u64 = MAX_MUTE_DURATION.as_secs() / 60;

fn base(name: &str, description: &str, permission: Permissions) -> CreateCommand {
    CreateCommand::new(name)
        .description(description)
        .default_member_permissions(permission)
        .add_option(
            CreateCommandOption::new(CommandOptionType::User, "user", "Member to act on")
                .required(true),
        )
}

fn reason_option() -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::String, "reason", "Shown in the audit log")
        .max_length(400)
}

pub fn definitions() -> Vec<CreateCommand> {
    vec![
        base(KICK, "Kick a member", Permissions::KICK_MEMBERS).add_option(reason_option()),
        base(BAN, "Ban a member", Permissions::BAN_MEMBERS).add_option(reason_option()),
        base(MUTE, "Time out a member", Permissions::MODERATE_MEMBERS)
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "minutes",
                    "Length of the timeout, 10 minutes by default",
                )
                .min_int_value(1)
                .max_int_value(MAX_MUTE_MINUTES),
            )
            .add_option(reason_option()),
    ]
}

/// Runs a moderation command invoked by `invoker_id`.
///
/// # Returns
/// - `Ok(String)` - Reply describing the outcome
/// - `Err(AppError::BadRequest)` - Unknown command or invalid target
/// - `Err(AppError::ModerationErr)` - Discord refused or failed the action
pub async fn run<A: ModerationApi>(
    state: &AppState,
    api: &A,
    guild_id: GuildId,
    invoker_id: UserId,
    command: &str,
    args: &CommandArgs,
) -> Result<String, AppError> {
    let action = match command {
        KICK => ModerationAction::Kick,
        BAN => ModerationAction::Ban,
        MUTE => ModerationAction::Mute {
            duration: mute_duration(args.integer("minutes"))?,
        },
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown command `/{}`.",
                other
            )))
        }
    };

    let target = args.require_user("user")?;
    if target == invoker_id {
        return Err(AppError::BadRequest(
            "You cannot use this command on yourself.".to_string(),
        ));
    }
    if target == api.bot_id() {
        return Err(AppError::BadRequest(
            "You cannot use this command on me.".to_string(),
        ));
    }

    let reason = format!(
        "{} (by {})",
        args.text("reason").unwrap_or("No reason given"),
        invoker_id
    );

    let outcome = state
        .dispatcher(api)
        .apply(guild_id, target, action.clone(), &reason)
        .await?;

    Ok(match (outcome, action) {
        (ActionOutcome::AlreadyGone, _) => format!("<@{}> is no longer in this server.", target),
        (ActionOutcome::Applied, ModerationAction::Mute { duration }) => format!(
            "<@{}> was timed out for {} minute(s).",
            target,
            duration.as_secs() / 60
        ),
        (ActionOutcome::Applied, ModerationAction::Ban) => format!("<@{}> was banned.", target),
        (ActionOutcome::Applied, _) => format!("<@{}> was kicked.", target),
    })
}

fn mute_duration(minutes: Option<i64>) -> Result<Duration, AppError> {
    let Some(minutes) = minutes else {
        return Ok(DEFAULT_MUTE_DURATION);
    };

    u64::try_from(minutes)
        .ok()
        .filter(|m| (1..=MAX_MUTE_MINUTES).contains(m))
        .map(|m| Duration::from_secs(m * 60))
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Minutes must be between 1 and {}.",
                MAX_MUTE_MINUTES
            ))
        })
}
