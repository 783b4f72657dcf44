use serenity::http::HttpError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single moderation call against Discord.
///
/// Variants map onto how the dispatcher reacts: `Transient` and `Timeout` are
/// retried once, `NotFound` is a no-op for removal-style actions, everything
/// else is surfaced immediately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModerationError {
    /// The bot lacks the permission or role hierarchy for the action.
    #[error("Missing permissions: {0}")]
    Permission(String),

    /// The target member, message, channel or webhook no longer exists.
    #[error("Target not found: {0}")]
    NotFound(String),

    /// Discord returned a 5xx/429 or the request never reached it.
    #[error("Transient Discord API failure: {0}")]
    Transient(String),

    /// The call did not complete within the configured action timeout.
    #[error("Discord API call timed out after {0:?}")]
    Timeout(Duration),

    /// Discord rejected the request for any other reason.
    #[error("Discord rejected the request: {0}")]
    Rejected(String),
}

impl ModerationError {
    /// Whether the dispatcher should retry the call once.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout(_))
    }
}

/// Maps the HTTP status of a failed Discord request onto a moderation error.
pub fn classify(status: u16, message: String) -> ModerationError {
    match status {
        401 | 403 => ModerationError::Permission(message),
        404 => ModerationError::NotFound(message),
        429 | 500..=599 => ModerationError::Transient(message),
        _ => ModerationError::Rejected(message),
    }
}

/// Classifies a serenity error by HTTP status.
impl From<serenity::Error> for ModerationError {
    fn from(err: serenity::Error) -> Self {
        match &err {
            serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => classify(
                response.status_code.as_u16(),
                response.error.message.clone(),
            ),
            serenity::Error::Http(HttpError::Request(e)) => Self::Transient(e.to_string()),
            serenity::Error::Io(e) => Self::Transient(e.to_string()),
            _ => Self::Rejected(err.to_string()),
        }
    }
}
