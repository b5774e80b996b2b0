//! Background job scheduler.
//!
//! Registers the daily availability sweep and the periodic dashboard
//! health checks against the shared [`AppState`].

use std::sync::Arc;

use chrono::Utc;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::notifier::run_availability_sweep;

/// Builds and starts the background job scheduler.
///
/// The returned handle must be kept alive for the lifetime of the process;
/// dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    config: &stayease_core::AppConfig,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_availability_job(&scheduler, state.clone(), &config.availability_cron).await?;
    register_health_job(&scheduler, state, &config.health.cron).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Daily availability sweep (default `0 0 8 * * *`).
async fn register_availability_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let state = Arc::new(state);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = Arc::clone(&state);

        Box::pin(async move {
            tracing::info!("scheduler: starting availability sweep");
            match run_availability_sweep(
                &state.pool,
                state.mailer.as_ref(),
                &state.notifier,
                Utc::now(),
            )
            .await
            {
                Ok(report) => tracing::info!(
                    matched = report.properties_matched,
                    sent = report.emails_sent,
                    failures = report.failures,
                    "scheduler: availability sweep complete"
                ),
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: availability sweep failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: availability job registered");
    Ok(())
}

/// Periodic dashboard health checks (default every five minutes).
async fn register_health_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let state = Arc::new(state);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = Arc::clone(&state);

        Box::pin(async move {
            let report = state.health.check_all(&state.pool).await;
            if report.overall_status != crate::health::OverallStatus::Healthy {
                tracing::warn!(
                    status = report.overall_status.as_str(),
                    "scheduler: system health degraded"
                );
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: health job registered");
    Ok(())
}
