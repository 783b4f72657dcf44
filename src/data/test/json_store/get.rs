use super::*;

/// Tests that reading an unknown guild returns defaults without persisting them.
///
/// Expected: default settings, no record created, no file written
#[tokio::test]
async fn returns_defaults_without_persisting() -> Result<(), SettingsError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = AntiRaidStore::load(test.path()).await?;

    let settings = store.get(GuildId::new(GUILD)).await;

    assert_eq!(settings, AntiRaidSettings::default());
    assert!(!store.contains(GuildId::new(GUILD)).await);
    assert!(!test.file("anti_raid.json").exists());

    Ok(())
}
