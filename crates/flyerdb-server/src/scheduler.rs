//! Background job scheduling for recurring scrapes.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::{run_and_ingest, AppState};

/// Weekly scrape slot: Mondays at 01:00 UTC, when the new flyer week is live.
const WEEKLY_SCRAPE_CRON: &str = "0 0 1 * * MON";

/// Builds and starts the job scheduler.
///
/// The returned handle must be kept alive; dropping it shuts the scheduler
/// down.
pub async fn build_scheduler(state: AppState) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_weekly_scrape(&scheduler, state).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_weekly_scrape(
    scheduler: &JobScheduler,
    state: AppState,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(WEEKLY_SCRAPE_CRON, move |_uuid, _lock| {
        let state = state.clone();
        Box::pin(async move {
            tracing::info!("scheduler: starting weekly scrape");
            run_weekly_scrape(&state).await;
            tracing::info!("scheduler: weekly scrape finished");
        })
    })?;
    scheduler.add(job).await?;
    Ok(())
}

/// One scheduled scrape run. Failures are logged, never propagated; the next
/// slot gets a fresh attempt.
async fn run_weekly_scrape(state: &AppState) {
    let Ok(_guard) = state.scrape_guard.try_lock() else {
        tracing::warn!("scheduler: a scrape is already running; skipping this slot");
        return;
    };

    match run_and_ingest(state).await {
        Ok((scrape, promotions)) => {
            tracing::info!(
                scrape_id = %scrape.scrape_id,
                promotions = promotions.len(),
                "scheduler: weekly scrape ingested"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: weekly scrape failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn weekly_cron_expression_is_valid() {
        let job = Job::new_async(WEEKLY_SCRAPE_CRON, |_uuid, _lock| Box::pin(async {}));
        assert!(job.is_ok());
    }
}
