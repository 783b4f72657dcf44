use super::*;

/// Tests removing a guild's settings.
///
/// Verifies that the record is gone from memory and disk and that reading it
/// afterwards yields defaults again.
///
/// Expected: Ok(true), then defaults
#[tokio::test]
async fn removes_existing_record() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_record("anti_raid.json", GUILD, serde_json::json!({ "enabled": true }))
        .with_record("anti_raid.json", 42, serde_json::json!({ "enabled": true }))
        .build()
        .await
        .unwrap();
    let store = AntiRaidStore::load(test.path()).await?;
    let guild_id = GuildId::new(GUILD);

    assert!(store.remove(guild_id).await?);

    assert_eq!(store.get(guild_id).await, AntiRaidSettings::default());
    let file = test.read_json("anti_raid.json").await;
    assert!(file.get("123456789").is_none());
    assert!(file.get("42").is_some());

    Ok(())
}

/// Tests removing a guild with no stored settings.
///
/// Expected: Ok(false), no file written
#[tokio::test]
async fn remove_missing_record_is_noop() -> Result<(), SettingsError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = AntiRaidStore::load(test.path()).await?;

    assert!(!store.remove(GuildId::new(GUILD)).await?);
    assert!(!test.file("anti_raid.json").exists());

    Ok(())
}
