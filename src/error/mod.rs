//! Error types for the bot.
//!
//! `AppError` is the top-level error returned from start-up and command handling.
//! It wraps the domain-specific errors of each layer: configuration loading,
//! settings persistence and moderation calls against Discord.

pub mod config;
pub mod moderation;
pub mod settings;

use thiserror::Error;

use crate::error::{config::ConfigError, moderation::ModerationError, settings::SettingsError};

/// Top-level application error type.
///
/// Aggregates all possible error types that can occur in the application. Most
/// variants use `#[from]` for automatic conversion with `?`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error during startup or environment variable loading.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Settings validation, corruption or persistence error.
    #[error(transparent)]
    SettingsErr(#[from] SettingsError),

    /// A moderation action failed after classification and retry.
    #[error(transparent)]
    ModerationErr(#[from] ModerationError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Background job scheduler failed to start.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Filesystem error, e.g. creating the data directory.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Invalid slash command input.
    ///
    /// The message is shown back to the invoker as-is.
    #[error("{0}")]
    BadRequest(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Message suitable for an ephemeral reply to the command invoker.
    ///
    /// Validation and bad-request errors are shown verbatim, moderation failures
    /// are summarized, anything else becomes a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::SettingsErr(SettingsError::Validation { .. }) => self.to_string(),
            Self::ModerationErr(err) => format!("Action failed: {}", err),
            _ => "Something went wrong, please try again later.".to_string(),
        }
    }
}
