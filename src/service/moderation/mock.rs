//! Scriptable in-memory `ModerationApi` for service tests.

use chrono::{DateTime, Utc};
use serenity::all::{ChannelId, GuildId, MessageId, UserId, WebhookId};
use serenity::async_trait;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use crate::{
    error::moderation::ModerationError,
    model::moderation::{LogEntry, WebhookInfo},
    service::{greeting::TextChannelApi, moderation::ModerationApi},
};

pub const BOT_ID: u64 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    DeleteMessage,
    Timeout,
    Kick,
    Ban,
    Webhooks,
    DeleteWebhook,
    FindChannel,
    CreateChannel,
    SendLog,
    SendText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DeleteMessage(MessageId),
    Timeout(UserId, DateTime<Utc>),
    Kick(UserId),
    Ban(UserId),
    Webhooks(ChannelId),
    DeleteWebhook(WebhookId),
    FindChannel(String),
    CreateChannel(String),
    SendLog(ChannelId, LogEntry),
    SendText(ChannelId, String),
}

impl Call {
    fn op(&self) -> Op {
        match self {
            Self::DeleteMessage(_) => Op::DeleteMessage,
            Self::Timeout(..) => Op::Timeout,
            Self::Kick(_) => Op::Kick,
            Self::Ban(_) => Op::Ban,
            Self::Webhooks(_) => Op::Webhooks,
            Self::DeleteWebhook(_) => Op::DeleteWebhook,
            Self::FindChannel(_) => Op::FindChannel,
            Self::CreateChannel(_) => Op::CreateChannel,
            Self::SendLog(..) => Op::SendLog,
            Self::SendText(..) => Op::SendText,
        }
    }
}

#[derive(Default)]
pub struct MockApi {
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Op, VecDeque<ModerationError>>>,
    stalled: Mutex<HashSet<Op>>,
    channels: Mutex<HashMap<String, ChannelId>>,
    webhooks: Mutex<Vec<WebhookInfo>>,
    next_channel: AtomicU64,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            next_channel: AtomicU64::new(5000),
            ..Default::default()
        }
    }

    /// Queues a failure for the next call of `op`; queued failures are consumed in order.
    pub fn fail(&self, op: Op, err: ModerationError) -> &Self {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(err);
        self
    }

    /// Makes every call of `op` hang forever.
    pub fn stall(&self, op: Op) -> &Self {
        self.stalled.lock().unwrap().insert(op);
        self
    }

    pub fn with_channel(&self, name: &str, channel_id: u64) -> &Self {
        self.channels
            .lock()
            .unwrap()
            .insert(name.to_string(), ChannelId::new(channel_id));
        self
    }

    pub fn forget_channel(&self, name: &str) {
        self.channels.lock().unwrap().remove(name);
    }

    pub fn with_webhook(&self, webhook_id: u64, creator: Option<u64>) -> &Self {
        self.webhooks.lock().unwrap().push(WebhookInfo {
            id: WebhookId::new(webhook_id),
            creator: creator.map(UserId::new),
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|call| call.op() == op).count()
    }

    /// Log entries sent so far, in order.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendLog(_, entry) => Some(entry),
                _ => None,
            })
            .collect()
    }

    async fn record(&self, call: Call) -> Result<(), ModerationError> {
        let op = call.op();
        self.calls.lock().unwrap().push(call);

        if self.stalled.lock().unwrap().contains(&op) {
            std::future::pending::<()>().await;
        }

        let failure = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front);

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ModerationApi for MockApi {
    fn bot_id(&self) -> UserId {
        UserId::new(BOT_ID)
    }

    async fn delete_message(
        &self,
        _channel_id: ChannelId,
        message_id: MessageId,
        _reason: &str,
    ) -> Result<(), ModerationError> {
        self.record(Call::DeleteMessage(message_id)).await
    }

    async fn timeout_member(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        until: DateTime<Utc>,
        _reason: &str,
    ) -> Result<(), ModerationError> {
        self.record(Call::Timeout(user_id, until)).await
    }

    async fn kick(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        _reason: &str,
    ) -> Result<(), ModerationError> {
        self.record(Call::Kick(user_id)).await
    }

    async fn ban(
        &self,
        _guild_id: GuildId,
        user_id: UserId,
        _reason: &str,
    ) -> Result<(), ModerationError> {
        self.record(Call::Ban(user_id)).await
    }

    async fn webhooks(&self, channel_id: ChannelId) -> Result<Vec<WebhookInfo>, ModerationError> {
        self.record(Call::Webhooks(channel_id)).await?;
        Ok(self.webhooks.lock().unwrap().clone())
    }

    async fn delete_webhook(
        &self,
        webhook_id: WebhookId,
        _reason: &str,
    ) -> Result<(), ModerationError> {
        self.record(Call::DeleteWebhook(webhook_id)).await?;
        self.webhooks
            .lock()
            .unwrap()
            .retain(|webhook| webhook.id != webhook_id);
        Ok(())
    }

    async fn find_text_channel(
        &self,
        _guild_id: GuildId,
        name: &str,
    ) -> Result<Option<ChannelId>, ModerationError> {
        self.record(Call::FindChannel(name.to_string())).await?;
        Ok(self.channels.lock().unwrap().get(name).copied())
    }

    async fn create_log_channel(
        &self,
        _guild_id: GuildId,
        name: &str,
    ) -> Result<ChannelId, ModerationError> {
        self.record(Call::CreateChannel(name.to_string())).await?;
        let channel_id = ChannelId::new(self.next_channel.fetch_add(1, Ordering::SeqCst));
        self.channels
            .lock()
            .unwrap()
            .insert(name.to_string(), channel_id);
        Ok(channel_id)
    }

    async fn send_log(
        &self,
        channel_id: ChannelId,
        entry: &LogEntry,
    ) -> Result<(), ModerationError> {
        self.record(Call::SendLog(channel_id, entry.clone())).await
    }
}

#[async_trait]
impl TextChannelApi for MockApi {
    async fn send_text(&self, channel_id: ChannelId, content: &str) -> Result<(), ModerationError> {
        self.record(Call::SendText(channel_id, content.to_string()))
            .await
    }
}
