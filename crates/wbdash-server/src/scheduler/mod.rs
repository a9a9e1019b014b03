//! Background job scheduler.
//!
//! Registers the periodic refresh job at server startup. The job uses
//! [`Refresher::try_refresh`], so a tick that lands while a cycle is still
//! running is skipped instead of queued.

use std::{sync::Arc, time::Duration};

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use wbdash_marketplace::{RefreshOutcome, Refresher};

/// Builds and starts the scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    refresher: Arc<Refresher>,
    interval: Duration,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_refresh_job(&scheduler, refresher, interval).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_refresh_job(
    scheduler: &JobScheduler,
    refresher: Arc<Refresher>,
    interval: Duration,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
        let refresher = Arc::clone(&refresher);

        Box::pin(async move {
            match refresher.try_refresh().await {
                RefreshOutcome::Published { products, .. } => {
                    tracing::info!(products, "scheduler: refresh complete");
                }
                RefreshOutcome::Skipped => {
                    tracing::info!("scheduler: refresh skipped, previous cycle still running");
                }
                RefreshOutcome::Failed => {
                    tracing::warn!("scheduler: refresh failed, serving previous snapshot");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(
        interval_secs = interval.as_secs(),
        "scheduler: refresh job registered"
    );
    Ok(())
}
