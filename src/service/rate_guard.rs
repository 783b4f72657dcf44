//! Sliding-window rate guard for anti-raid checks.
//!
//! One window exists per (guild, actor, metric). The map only hands out the
//! window; the count itself is updated under the window's own mutex, so bursts
//! from one member never contend with checks for other members or guilds.

use dashmap::DashMap;
use serenity::all::{GuildId, UserId};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use crate::{
    data::AntiRaidStore,
    model::rate::{Metric, WindowVerdict},
};

/// How often the background task drops idle windows.
pub const REAP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct WindowKey {
    guild_id: GuildId,
    actor_id: UserId,
    metric: Metric,
}

/// Recent event instants for one actor and metric, oldest first.
#[derive(Debug, Default)]
struct RateWindow {
    timestamps: VecDeque<Instant>,
}

impl RateWindow {
    /// Drops every instant older than `window` relative to `now`.
    fn evict(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) > window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Evicts stale instants, records `events` at `now` and returns the count.
    fn record(&mut self, now: Instant, window: Duration, events: usize) -> usize {
        self.evict(now, window);

        // Concurrent handlers may observe slightly older instants than the newest entry.
        let at = self.timestamps.partition_point(|&t| t <= now);
        for _ in 0..events {
            self.timestamps.insert(at, now);
        }

        self.timestamps.len()
    }

    fn len(&self) -> usize {
        self.timestamps.len()
    }

    fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

fn lock(window: &Mutex<RateWindow>) -> MutexGuard<'_, RateWindow> {
    window.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct RateGuard {
    settings: Arc<AntiRaidStore>,
    windows: DashMap<WindowKey, Arc<Mutex<RateWindow>>>,
}

impl RateGuard {
    pub fn new(settings: Arc<AntiRaidStore>) -> Self {
        Self {
            settings,
            windows: DashMap::new(),
        }
    }

    /// Records one event for the actor and checks it against the guild's limit.
    ///
    /// # Arguments
    /// - `guild_id` - Guild the event happened in
    /// - `actor_id` - Member who caused the event
    /// - `metric` - What is being counted
    /// - `now` - Monotonic instant of the event
    ///
    /// # Returns
    /// - `WindowVerdict` - `allowed` is false once the count exceeds the limit
    pub async fn record_and_check(
        &self,
        guild_id: GuildId,
        actor_id: UserId,
        metric: Metric,
        now: Instant,
    ) -> WindowVerdict {
        self.record_events(guild_id, actor_id, metric, 1, now).await
    }

    /// Records `events` simultaneous events, e.g. every mention of one message.
    ///
    /// Whitelisted actors are always allowed and their window is never created
    /// or updated.
    pub async fn record_events(
        &self,
        guild_id: GuildId,
        actor_id: UserId,
        metric: Metric,
        events: usize,
        now: Instant,
    ) -> WindowVerdict {
        let settings = self.settings.get(guild_id).await;
        if settings.is_whitelisted(actor_id) {
            return WindowVerdict::exempt();
        }

        let limit = metric.limit(&settings) as usize;
        let window = self.window(WindowKey {
            guild_id,
            actor_id,
            metric,
        });
        let count_in_window = lock(&window).record(now, metric.window(), events);

        WindowVerdict {
            allowed: count_in_window <= limit,
            count_in_window,
        }
    }

    /// Number of instants currently held for the actor, without evicting.
    pub fn window_len(&self, guild_id: GuildId, actor_id: UserId, metric: Metric) -> usize {
        let key = WindowKey {
            guild_id,
            actor_id,
            metric,
        };
        self.windows.get(&key).map(|w| lock(&w).len()).unwrap_or(0)
    }

    /// Number of windows currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }

    /// Drops windows that are empty after eviction and not held by an in-flight check.
    ///
    /// # Returns
    /// - `usize` - Number of windows removed
    pub fn reap(&self, now: Instant) -> usize {
        let before = self.windows.len();

        self.windows.retain(|key, window| {
            if Arc::strong_count(window) > 1 {
                return true;
            }
            let mut window = lock(window);
            window.evict(now, key.metric.window());
            !window.is_empty()
        });

        before.saturating_sub(self.windows.len())
    }

    fn window(&self, key: WindowKey) -> Arc<Mutex<RateWindow>> {
        Arc::clone(&self.windows.entry(key).or_default())
    }
}
