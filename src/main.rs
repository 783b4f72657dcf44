mod bot;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod startup;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::AppError, scheduler::window_reaper};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = startup::load_state(&config).await?;

    tracing::info!("Loaded settings from {}", config.data_dir.display());

    let mut reaper = window_reaper::start_scheduler(Arc::clone(&state.guard)).await?;

    let client = bot::start::init_bot(&config, state).await?;
    let result = bot::start::start_bot(client).await;

    if let Err(e) = reaper.shutdown().await {
        tracing::warn!("Failed to stop rate window reaper: {}", e);
    }

    result
}
