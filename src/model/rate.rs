use std::time::Duration;

use crate::model::settings::AntiRaidSettings;

/// Trailing window for messages and mentions.
pub const MESSAGE_WINDOW: Duration = Duration::from_secs(5);
/// Trailing window for joins.
pub const JOIN_WINDOW: Duration = Duration::from_secs(60);

/// What the rate-window guard is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Message,
    Mention,
    Join,
}

impl Metric {
    pub fn window(self) -> Duration {
        match self {
            Self::Message | Self::Mention => MESSAGE_WINDOW,
            Self::Join => JOIN_WINDOW,
        }
    }

    /// Configured maximum number of events within the window.
    pub fn limit(self, settings: &AntiRaidSettings) -> u32 {
        match self {
            Self::Message => settings.message_limit,
            Self::Mention => settings.mention_limit,
            Self::Join => settings.join_limit,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Mention => "mention",
            Self::Join => "join",
        }
    }
}

/// Result of recording events in a rate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowVerdict {
    /// `false` once the count exceeds the guild's limit for the metric.
    pub allowed: bool,
    /// Events inside the window, including the ones just recorded.
    pub count_in_window: usize,
}

impl WindowVerdict {
    /// Verdict for whitelisted actors, whose windows are never touched.
    pub fn exempt() -> Self {
        Self {
            allowed: true,
            count_in_window: 0,
        }
    }
}
