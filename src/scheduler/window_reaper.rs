use std::{sync::Arc, time::Instant};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    error::AppError,
    service::rate_guard::{RateGuard, REAP_INTERVAL},
};

/// Starts the rate window reaper
///
/// Runs every `REAP_INTERVAL` and drops windows that no longer hold any event
/// inside their trailing window, so members who went quiet stop costing memory.
///
/// # Arguments
/// - `guard`: Rate guard owning the windows
pub async fn start_scheduler(guard: Arc<RateGuard>) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_repeated_async(REAP_INTERVAL, move |_uuid, _lock| {
        let guard = Arc::clone(&guard);

        Box::pin(async move {
            let removed = guard.reap(Instant::now());
            if removed > 0 {
                tracing::debug!(
                    "Reaped {} idle rate window(s), {} still tracked",
                    removed,
                    guard.tracked()
                );
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Rate window reaper started");

    Ok(scheduler)
}
