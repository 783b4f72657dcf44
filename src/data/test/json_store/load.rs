use super::*;
use crate::data::json_store::parse_records;
use std::path::Path;

/// Tests loading when no settings file exists yet.
///
/// Verifies that a fresh data directory yields an empty store and that loading
/// does not create the file.
///
/// Expected: Ok with no records and no file written
#[tokio::test]
async fn loads_empty_store_without_file() -> Result<(), SettingsError> {
    let test = TestBuilder::new().build().await.unwrap();

    let store = AntiRaidStore::load(test.path()).await?;

    assert!(!store.contains(GuildId::new(GUILD)).await);
    assert!(!test.file("anti_raid.json").exists());

    Ok(())
}

/// Tests loading persisted records.
///
/// Expected: Ok with the stored values and defaults for missing keys
#[tokio::test]
async fn loads_persisted_records() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_record(
            "anti_raid.json",
            GUILD,
            serde_json::json!({ "enabled": true, "messageLimit": 8, "whitelist": ["42"] }),
        )
        .build()
        .await
        .unwrap();

    let store = AntiRaidStore::load(test.path()).await?;
    let settings = store.get(GuildId::new(GUILD)).await;

    assert!(settings.enabled);
    assert_eq!(settings.message_limit, 8);
    assert_eq!(settings.join_limit, AntiRaidSettings::default().join_limit);
    assert!(settings.is_whitelisted(UserId::new(42)));

    Ok(())
}

/// Tests recovery from an unparsable settings file.
///
/// Verifies that a corrupted file does not fail start-up, that every guild falls
/// back to defaults and that the corrupted file is preserved next to the original.
///
/// Expected: Ok with defaults and a `.corrupt` backup
#[tokio::test]
async fn recovers_from_corrupted_file() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_file("anti_raid.json", "{ \"123\": { \"messageLimit\": ")
        .build()
        .await
        .unwrap();

    let store = AntiRaidStore::load(test.path()).await?;

    assert_eq!(store.get(GuildId::new(GUILD)).await, AntiRaidSettings::default());
    assert!(test.file("anti_raid.json.corrupt").exists());

    Ok(())
}

/// Tests that one malformed guild entry does not affect the others.
///
/// Expected: valid guild loaded, malformed guild falls back to defaults
#[tokio::test]
async fn skips_malformed_guild_entry() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_record("anti_raid.json", GUILD, serde_json::json!({ "messageLimit": 3 }))
        .with_record("anti_raid.json", 987, serde_json::json!({ "messageLimit": "lots" }))
        .build()
        .await
        .unwrap();

    let store = AntiRaidStore::load(test.path()).await?;

    assert_eq!(store.get(GuildId::new(GUILD)).await.message_limit, 3);
    assert!(!store.contains(GuildId::new(987)).await);

    Ok(())
}

/// Tests that each problem in a file is reported as a corruption.
///
/// Verifies unknown fields, out-of-range limits and invalid guild keys are all
/// reported with the offending guild key.
///
/// Expected: three ConfigCorruption errors, one valid record
#[test]
fn reports_each_corrupt_entry() {
    let contents = r#"{
        "1": { "messageLimit": 4 },
        "2": { "messageLimit": 0 },
        "3": { "floodLimit": 2 },
        "guild": {}
    }"#;

    let (records, corruptions) =
        parse_records::<AntiRaidSettings>(Path::new("anti_raid.json"), contents);

    assert_eq!(records.len(), 1);
    assert_eq!(corruptions.len(), 3);
    let keys: Vec<_> = corruptions
        .iter()
        .filter_map(|c| match c {
            SettingsError::ConfigCorruption { guild_id, .. } => guild_id.clone(),
            _ => None,
        })
        .collect();
    assert_eq!(keys, vec!["2", "3", "guild"]);
}

/// Tests that the greeting store reads its own file.
///
/// Expected: Ok with the welcome channel from welcome.json
#[tokio::test]
async fn greeting_store_uses_separate_file() -> Result<(), SettingsError> {
    let test = TestBuilder::new()
        .with_record(
            "welcome.json",
            GUILD,
            serde_json::json!({ "channelId": "555", "welcomeEnabled": true }),
        )
        .build()
        .await
        .unwrap();

    let store = GreetingStore::load(test.path()).await?;
    let settings = store.get(GuildId::new(GUILD)).await;

    assert_eq!(settings.channel_id.map(|c| c.get()), Some(555));
    assert!(settings.welcome_enabled);

    Ok(())
}
