//! Test factory for creating Serenity Message objects.

use serenity::all::{Message, User};

/// Creates a test Serenity guild Message with plain content and no mentions.
///
/// Mentions can be added afterwards through the public `mentions`,
/// `mention_roles` and `mention_everyone` fields.
///
/// # Arguments
/// - `message_id` - Discord message ID
/// - `guild_id` - Guild the message was sent in
/// - `channel_id` - Channel the message was sent in
/// - `author` - Message author
///
/// # Panics
/// - If the JSON cannot be deserialized into a Message (indicates invalid test data)
pub fn create_test_message(message_id: u64, guild_id: u64, channel_id: u64, author: User) -> Message {
    serde_json::from_value(serde_json::json!({
        "id": message_id.to_string(),
        "channel_id": channel_id.to_string(),
        "guild_id": guild_id.to_string(),
        "author": author,
        "content": "hello",
        "timestamp": "2024-01-01T00:00:00.000000+00:00",
        "edited_timestamp": null,
        "tts": false,
        "mention_everyone": false,
        "mentions": [],
        "mention_roles": [],
        "attachments": [],
        "embeds": [],
        "pinned": false,
        "type": 0,
    }))
    .expect("Failed to create test message - invalid JSON structure")
}
