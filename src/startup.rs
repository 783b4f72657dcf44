use crate::{
    config::Config,
    data::{AntiRaidStore, GreetingStore},
    error::AppError,
    service::moderation::CallPolicy,
    state::AppState,
};

/// Creates the data directory and loads every settings store from it.
///
/// Corrupted settings files do not fail start-up; they are logged and recovered
/// by the stores themselves.
///
/// # Arguments
/// - `config` - Application configuration containing the data directory
///
/// # Returns
/// - `Ok(AppState)` - State with all stores loaded
/// - `Err(AppError)` - The data directory could not be created or read
pub async fn load_state(config: &Config) -> Result<AppState, AppError> {
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let anti_raid = AntiRaidStore::load(&config.data_dir).await?;
    let greetings = GreetingStore::load(&config.data_dir).await?;

    Ok(AppState::new(
        anti_raid,
        greetings,
        CallPolicy::new(config.action_timeout),
    ))
}
