//! Test factory for creating Serenity Member objects.

use serenity::all::{Member, User};

/// Creates a test Serenity guild Member.
///
/// The member joined on 2020-01-01, is not pending and has no timeout.
///
/// # Arguments
/// - `guild_id` - Discord guild ID the member belongs to
/// - `user` - The member's user object
/// - `role_ids` - IDs of the roles assigned to the member
///
/// # Panics
/// - If the JSON cannot be deserialized into a Member (indicates invalid test data)
pub fn create_test_member(guild_id: u64, user: User, role_ids: &[u64]) -> Member {
    let roles: Vec<String> = role_ids.iter().map(|id| id.to_string()).collect();

    serde_json::from_value(serde_json::json!({
        "guild_id": guild_id.to_string(),
        "user": user,
        "nick": null,
        "avatar": null,
        "roles": roles,
        "joined_at": "2020-01-01T00:00:00.000000+00:00",
        "premium_since": null,
        "deaf": false,
        "mute": false,
        "flags": 0,
        "pending": false,
        "communication_disabled_until": null,
    }))
    .expect("Failed to create test member - invalid JSON structure")
}
