use super::*;

/// Tests that a partial write changes only the given field.
///
/// Verifies that setting messageLimit to 8 keeps every other field at its prior
/// value, both in memory and after reloading from disk.
///
/// Expected: Ok with messageLimit 8 and other fields unchanged
#[tokio::test]
async fn merges_partial_update() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_record(
            "anti_raid.json",
            GUILD,
            serde_json::json!({ "joinLimit": 7, "autoBan": true, "logChannel": "raid-log" }),
        )
        .build()
        .await
        .unwrap();
    let store = AntiRaidStore::load(test.path()).await?;
    let guild_id = GuildId::new(GUILD);
    let before = store.get(guild_id).await;

    store
        .set(
            guild_id,
            AntiRaidPatch {
                message_limit: Some(8),
                ..Default::default()
            },
        )
        .await?;

    let after = store.get(guild_id).await;
    assert_eq!(after.message_limit, 8);
    assert_eq!(
        after,
        AntiRaidSettings {
            message_limit: 8,
            ..before
        }
    );

    let reloaded = AntiRaidStore::load(test.path()).await?;
    assert_eq!(reloaded.get(guild_id).await, after);

    Ok(())
}

/// Tests that an invalid write is rejected without side effects.
///
/// Expected: Err(Validation), memory and file unchanged
#[tokio::test]
async fn rejects_invalid_limit_and_keeps_prior_settings() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_record("anti_raid.json", GUILD, serde_json::json!({ "messageLimit": 6 }))
        .build()
        .await
        .unwrap();
    let store = AntiRaidStore::load(test.path()).await?;
    let guild_id = GuildId::new(GUILD);
    let file_before = test.read("anti_raid.json").await;

    let result = store
        .set(
            guild_id,
            AntiRaidPatch {
                message_limit: Some(0),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(SettingsError::Validation { .. })));
    assert_eq!(store.get(guild_id).await.message_limit, 6);
    assert_eq!(test.read("anti_raid.json").await, file_before);

    Ok(())
}

/// Tests that a write round-trips exactly through the file.
///
/// Expected: reloaded record equals the written record, file keyed by guild id
#[tokio::test]
async fn round_trips_every_field() -> Result<(), SettingsError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = AntiRaidStore::load(test.path()).await?;
    let guild_id = GuildId::new(GUILD);

    let written = store
        .set(
            guild_id,
            AntiRaidPatch {
                enabled: Some(true),
                join_limit: Some(3),
                message_limit: Some(4),
                mention_limit: Some(2),
                account_age_days: Some(14),
                auto_ban: Some(true),
                auto_mute: Some(false),
                webhook_protection: Some(true),
                bot_join_restriction: Some(true),
                log_channel: Some("mod-log".to_string()),
                whitelist: Some([UserId::new(1), UserId::new(2)].into_iter().collect()),
            },
        )
        .await?;

    let reloaded = AntiRaidStore::load(test.path()).await?;
    assert_eq!(reloaded.get(guild_id).await, written);

    let file = test.read_json("anti_raid.json").await;
    assert_eq!(file["123456789"]["accountAgeDays"], 14);
    assert_eq!(file["123456789"]["whitelist"], serde_json::json!(["1", "2"]));
    assert!(!test.file("anti_raid.json.tmp").exists());

    Ok(())
}
