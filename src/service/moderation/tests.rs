use chrono::{TimeDelta, Utc};
use serenity::all::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use std::time::Duration;
use test_utils::{builder::TestBuilder, context::TestContext};

use super::{
    mock::{Call, MockApi, Op},
    CallPolicy, LogChannelCache, ModerationDispatcher,
};
use crate::{
    data::AntiRaidStore,
    error::moderation::ModerationError,
    model::moderation::{ActionOutcome, ModerationAction, COLOR_ACTION, COLOR_FAILURE},
};

const GUILD: u64 = 42;
const ACTOR: u64 = 7;

struct Fixture {
    _test: TestContext,
    api: MockApi,
    store: AntiRaidStore,
    cache: LogChannelCache,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_settings(Some(serde_json::json!({}))).await
    }

    async fn with_settings(settings: Option<serde_json::Value>) -> Self {
        let mut builder = TestBuilder::new();
        if let Some(settings) = settings {
            builder = builder.with_record("anti_raid.json", GUILD, settings);
        }
        let test = builder.build().await.unwrap();
        let store = AntiRaidStore::load(test.path()).await.unwrap();

        Self {
            _test: test,
            api: MockApi::new(),
            store,
            cache: LogChannelCache::new(),
        }
    }

    fn dispatcher(&self) -> ModerationDispatcher<'_, MockApi> {
        ModerationDispatcher::new(
            &self.api,
            &self.store,
            &self.cache,
            CallPolicy::new(Duration::from_secs(10)),
        )
    }

    async fn apply(&self, action: ModerationAction) -> Result<ActionOutcome, ModerationError> {
        self.dispatcher()
            .apply(GuildId::new(GUILD), UserId::new(ACTOR), action, "test")
            .await
    }
}

/// Tests that kicking a member who already left counts as done.
///
/// Expected: Ok(AlreadyGone), no retry, nothing logged
#[tokio::test]
async fn kick_of_missing_member_is_already_gone() {
    let fx = Fixture::new().await;
    fx.api
        .fail(Op::Kick, ModerationError::NotFound("Unknown Member".into()));

    let outcome = fx.apply(ModerationAction::Kick).await;

    assert_eq!(outcome, Ok(ActionOutcome::AlreadyGone));
    assert_eq!(fx.api.count(Op::Kick), 1);
    assert!(fx.api.logs().is_empty());
}

/// Tests the same for bans, message deletes and webhook deletes.
///
/// Expected: Ok(AlreadyGone) for each
#[tokio::test]
async fn removal_actions_tolerate_missing_targets() {
    let fx = Fixture::new().await;
    let cases = [
        (Op::Ban, ModerationAction::Ban),
        (
            Op::DeleteMessage,
            ModerationAction::DeleteMessage {
                channel_id: ChannelId::new(1),
                message_id: MessageId::new(2),
            },
        ),
        (
            Op::DeleteWebhook,
            ModerationAction::DeleteWebhook {
                webhook_id: WebhookId::new(3),
            },
        ),
    ];

    for (op, action) in cases {
        fx.api.fail(op, ModerationError::NotFound("gone".into()));
        assert_eq!(fx.apply(action).await, Ok(ActionOutcome::AlreadyGone));
    }
}

/// Tests that muting a member who is gone is a failure.
///
/// Expected: Err(NotFound) and a failure notice in the log channel
#[tokio::test]
async fn mute_of_missing_member_fails() {
    let fx = Fixture::new().await;
    fx.api
        .fail(Op::Timeout, ModerationError::NotFound("Unknown Member".into()));

    let outcome = fx
        .apply(ModerationAction::Mute {
            duration: Duration::from_secs(600),
        })
        .await;

    assert!(matches!(outcome, Err(ModerationError::NotFound(_))));
    let logs = fx.api.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].color, COLOR_FAILURE);
}

/// Tests that a successful action is logged, creating the log channel once.
///
/// Expected: one channel creation, two log entries in that channel
#[tokio::test]
async fn creates_log_channel_once_and_reuses_it() {
    let fx = Fixture::new().await;

    assert_eq!(fx.apply(ModerationAction::Ban).await, Ok(ActionOutcome::Applied));
    assert_eq!(fx.apply(ModerationAction::Kick).await, Ok(ActionOutcome::Applied));

    assert_eq!(fx.api.count(Op::CreateChannel), 1);
    assert_eq!(fx.api.count(Op::FindChannel), 1);

    let sends: Vec<ChannelId> = fx
        .api
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::SendLog(channel_id, entry) => {
                assert_eq!(entry.color, COLOR_ACTION);
                Some(channel_id)
            }
            _ => None,
        })
        .collect();
    assert_eq!(sends.len(), 2);
    assert_eq!(sends[0], sends[1]);
}

/// Tests that an existing channel with the configured name is used.
///
/// Expected: no channel creation, entry sent to the existing channel
#[tokio::test]
async fn uses_existing_log_channel() {
    let fx = Fixture::new().await;
    fx.api.with_channel("anti-raid-logs", 77);

    fx.apply(ModerationAction::Kick).await.unwrap();

    assert_eq!(fx.api.count(Op::CreateChannel), 0);
    assert!(fx
        .api
        .calls()
        .contains(&Call::SendLog(ChannelId::new(77), fx.api.logs()[0].clone())));
}

/// Tests that a cached log channel which was deleted is resolved again.
///
/// Expected: second entry goes to a freshly created channel
#[tokio::test]
async fn recreates_deleted_log_channel() {
    let fx = Fixture::new().await;
    fx.api.with_channel("anti-raid-logs", 77);
    fx.apply(ModerationAction::Kick).await.unwrap();

    fx.api.forget_channel("anti-raid-logs");
    fx.api
        .fail(Op::SendLog, ModerationError::NotFound("Unknown Channel".into()));
    fx.apply(ModerationAction::Ban).await.unwrap();

    assert_eq!(fx.api.count(Op::CreateChannel), 1);
    let last = fx.api.calls().into_iter().last().unwrap();
    assert!(matches!(last, Call::SendLog(channel_id, _) if channel_id != ChannelId::new(77)));
}

/// Tests that a transient failure is retried exactly once.
///
/// Expected: two attempts, the error from the second is returned
#[tokio::test(start_paused = true)]
async fn retries_transient_failure_once() {
    let fx = Fixture::new().await;
    fx.api
        .fail(Op::Kick, ModerationError::Transient("502".into()))
        .fail(Op::Kick, ModerationError::Transient("503".into()));

    let outcome = fx.apply(ModerationAction::Kick).await;

    assert_eq!(outcome, Err(ModerationError::Transient("503".into())));
    assert_eq!(fx.api.count(Op::Kick), 2);
}

/// Tests that a retry after a transient failure can succeed.
///
/// Expected: Ok(Applied) after two attempts
#[tokio::test(start_paused = true)]
async fn transient_failure_then_success() {
    let fx = Fixture::new().await;
    fx.api
        .fail(Op::Ban, ModerationError::Transient("429".into()));

    assert_eq!(fx.apply(ModerationAction::Ban).await, Ok(ActionOutcome::Applied));
    assert_eq!(fx.api.count(Op::Ban), 2);
}

/// Tests that permission failures are not retried and are reported.
///
/// Expected: one attempt, failure notice naming the error
#[tokio::test]
async fn permission_failure_is_not_retried() {
    let fx = Fixture::new().await;
    fx.api
        .fail(Op::Ban, ModerationError::Permission("Missing Permissions".into()));

    let outcome = fx.apply(ModerationAction::Ban).await;

    assert!(matches!(outcome, Err(ModerationError::Permission(_))));
    assert_eq!(fx.api.count(Op::Ban), 1);
    let logs = fx.api.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].color, COLOR_FAILURE);
    assert!(logs[0]
        .fields
        .iter()
        .any(|(name, value)| name == "Error" && value.contains("Missing Permissions")));
}

/// Tests that a hanging call is cut off by the action timeout and retried once.
///
/// Expected: Err(Timeout) after two attempts
#[tokio::test(start_paused = true)]
async fn hanging_call_times_out() {
    let fx = Fixture::new().await;
    fx.api.stall(Op::Kick);

    let outcome = fx.apply(ModerationAction::Kick).await;

    assert_eq!(outcome, Err(ModerationError::Timeout(Duration::from_secs(10))));
    assert_eq!(fx.api.count(Op::Kick), 2);
}

/// Tests that a failing log channel never masks the action result.
///
/// Expected: Ok(Applied) although sending the log entry fails
#[tokio::test]
async fn log_failure_does_not_mask_success() {
    let fx = Fixture::new().await;
    fx.api
        .fail(Op::CreateChannel, ModerationError::Permission("Missing Access".into()));

    assert_eq!(fx.apply(ModerationAction::Kick).await, Ok(ActionOutcome::Applied));
    assert!(fx.api.logs().is_empty());
}

/// Tests that mute durations are clamped to Discord's maximum.
///
/// Expected: timeout ends no later than 28 days from now
#[tokio::test]
async fn clamps_mute_duration() {
    let fx = Fixture::new().await;

    fx.apply(ModerationAction::Mute {
        duration: Duration::from_secs(60 * 24 * 60 * 60),
    })
    .await
    .unwrap();

    let until = fx
        .api
        .calls()
        .into_iter()
        .find_map(|call| match call {
            Call::Timeout(_, until) => Some(until),
            _ => None,
        })
        .unwrap();
    assert!(until <= Utc::now() + TimeDelta::days(28));
    assert!(until > Utc::now() + TimeDelta::days(27));
}

/// Tests that a stored log channel name is looked up the way Discord names it.
///
/// Expected: the existing "raid-logs" channel is used, nothing created
#[tokio::test]
async fn finds_log_channel_by_discord_name() {
    let fx = Fixture::with_settings(Some(serde_json::json!({ "logChannel": "Raid Logs" }))).await;
    fx.api.with_channel("raid-logs", 77);

    fx.apply(ModerationAction::Kick).await.unwrap();

    assert_eq!(fx.api.count(Op::CreateChannel), 0);
    assert!(fx
        .api
        .calls()
        .contains(&Call::FindChannel("raid-logs".to_string())));
    assert!(matches!(
        fx.api.calls().last(),
        Some(Call::SendLog(channel_id, _)) if *channel_id == ChannelId::new(77)
    ));
}

/// Tests that guilds without anti-raid settings get no log channel.
///
/// Expected: action applied, no channel lookup, creation or log entry
#[tokio::test]
async fn no_log_channel_without_settings() {
    let fx = Fixture::with_settings(None).await;

    let outcome = fx.apply(ModerationAction::Ban).await;

    assert_eq!(outcome, Ok(ActionOutcome::Applied));
    assert_eq!(fx.api.count(Op::FindChannel), 0);
    assert_eq!(fx.api.count(Op::CreateChannel), 0);
    assert!(fx.api.logs().is_empty());
}
