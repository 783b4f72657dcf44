//! Shared state handed to every gateway event handler.
//!
//! Built once at start-up. All fields are reference counted or `Copy`, so the
//! state is cloned freely into the bot handler and background jobs.

use std::sync::Arc;

use crate::{
    data::{AntiRaidStore, GreetingStore},
    service::{
        anti_raid::AntiRaidService,
        greeting::{GreetingService, TextChannelApi},
        moderation::{CallPolicy, LogChannelCache, ModerationApi, ModerationDispatcher},
        rate_guard::RateGuard,
    },
};

#[derive(Clone)]
pub struct AppState {
    /// Per-guild anti-raid settings (`anti_raid.json`).
    pub anti_raid: Arc<AntiRaidStore>,

    /// Per-guild welcome and goodbye settings (`welcome.json`).
    pub greetings: Arc<GreetingStore>,

    /// Sliding windows of recent events per member.
    pub guard: Arc<RateGuard>,

    /// Resolved log channel ids per guild.
    pub log_channels: Arc<LogChannelCache>,

    /// Timeout and retry policy for Discord calls.
    pub policy: CallPolicy,
}

impl AppState {
    pub fn new(anti_raid: AntiRaidStore, greetings: GreetingStore, policy: CallPolicy) -> Self {
        let anti_raid = Arc::new(anti_raid);

        Self {
            guard: Arc::new(RateGuard::new(Arc::clone(&anti_raid))),
            anti_raid,
            greetings: Arc::new(greetings),
            log_channels: Arc::new(LogChannelCache::new()),
            policy,
        }
    }

    pub fn dispatcher<'a, A: ModerationApi>(&'a self, api: &'a A) -> ModerationDispatcher<'a, A> {
        ModerationDispatcher::new(api, &self.anti_raid, &self.log_channels, self.policy)
    }

    pub fn anti_raid_service<'a, A: ModerationApi>(&'a self, api: &'a A) -> AntiRaidService<'a, A> {
        AntiRaidService::new(&self.anti_raid, &self.guard, self.dispatcher(api))
    }

    pub fn greeting_service<'a, A: TextChannelApi>(&'a self, api: &'a A) -> GreetingService<'a, A> {
        GreetingService::new(api, &self.greetings, self.policy)
    }
}
