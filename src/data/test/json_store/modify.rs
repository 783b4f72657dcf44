use super::*;

/// Tests whitelist read-modify-write through `modify`.
///
/// Expected: Ok with both users whitelisted after two concurrent updates
#[tokio::test]
async fn concurrent_modifications_do_not_lose_updates() -> Result<(), SettingsError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = AntiRaidStore::load(test.path()).await?;
    let guild_id = GuildId::new(GUILD);

    let (a, b) = tokio::join!(
        store.modify(guild_id, |s| {
            s.whitelist.insert(UserId::new(1));
            Ok(())
        }),
        store.modify(guild_id, |s| {
            s.whitelist.insert(UserId::new(2));
            Ok(())
        }),
    );
    a?;
    b?;

    let settings = store.get(guild_id).await;
    assert!(settings.is_whitelisted(UserId::new(1)));
    assert!(settings.is_whitelisted(UserId::new(2)));

    Ok(())
}

/// Tests that an error returned by the change closure aborts the write.
///
/// Expected: Err from closure, no record created
#[tokio::test]
async fn closure_error_aborts_write() -> Result<(), SettingsError> {
    let test = TestBuilder::new().build().await.unwrap();
    let store = AntiRaidStore::load(test.path()).await?;
    let guild_id = GuildId::new(GUILD);

    let result = store
        .modify(guild_id, |_| {
            Err(SettingsError::validation("whitelist", "user is not whitelisted"))
        })
        .await;

    assert!(result.is_err());
    assert!(!store.contains(guild_id).await);

    Ok(())
}
