use anyhow::Result;
use contracts::usecases::u510_calculate_commissions::CalculateCommissionsRequest;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info, warn};

use super::executor::run_calculation;
use super::job_queue::{self, CalcJob};
use super::{progress_tracker, run_lock};
use crate::shared::config::CommissionConfig;

/// Background worker draining the commission job queue.
pub struct CalcJobWorker {
    db: DatabaseConnection,
    settings: CommissionConfig,
    wake: Arc<Notify>,
    interval_seconds: u64,
}

impl CalcJobWorker {
    pub fn new(db: DatabaseConnection, settings: CommissionConfig, wake: Arc<Notify>) -> Self {
        let interval_seconds = settings.worker_interval_seconds.max(1);
        Self {
            db,
            settings,
            wake,
            interval_seconds,
        }
    }

    /// Puts jobs of a crashed process back in the queue and drops their locks.
    /// Call once at startup, before `run_loop`.
    pub async fn recover_interrupted(&self) -> Result<()> {
        let requeued = job_queue::requeue_running(&self.db).await?;
        let released = run_lock::release_all(&self.db).await?;
        if requeued > 0 || released > 0 {
            warn!(
                "Recovered {} interrupted commission jobs, released {} stale locks",
                requeued, released
            );
        }
        Ok(())
    }

    /// Runs until the process exits: on every tick and on every wake-up
    pub async fn run_loop(&self) {
        info!(
            "Commission job worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = self.wake.notified() => {}
            }
            if let Err(e) = self.process_pending().await {
                error!("Error processing commission jobs: {:?}", e);
            }
        }
    }

    /// Starts every pending job whose month is free. Returns handles of the started runs.
    pub async fn process_pending(&self) -> Result<Vec<JoinHandle<()>>> {
        let mut started = Vec::new();
        for job in job_queue::list_pending(&self.db).await? {
            if !run_lock::try_acquire(&self.db, &job.commission_month, &job.calc_id).await? {
                info!(
                    "Job {} waits: {} is locked by another run",
                    job.calc_id, job.commission_month
                );
                continue;
            }
            if !job_queue::claim(&self.db, &job.calc_id).await? {
                run_lock::release(&self.db, &job.commission_month, &job.calc_id).await?;
                continue;
            }
            if job.attempts > 0 {
                if let Err(e) = progress_tracker::restart(&self.db, &job.calc_id).await {
                    warn!("Could not reset progress of {}: {:?}", job.calc_id, e);
                }
            }

            info!(
                "Starting commission job {} for {} (attempt {})",
                job.calc_id,
                job.commission_month,
                job.attempts + 1
            );
            let db = self.db.clone();
            let settings = self.settings.clone();
            started.push(tokio::spawn(async move {
                run_job(&db, &settings, job).await;
            }));
        }
        Ok(started)
    }
}

async fn run_job(db: &DatabaseConnection, settings: &CommissionConfig, job: CalcJob) {
    let request = CalculateCommissionsRequest {
        month: job.month.clone(),
        year: job.year,
        sales_person: job.sales_person.clone(),
    };

    let outcome = run_calculation(db, settings, &job.calc_id, &request).await;
    let job_error = outcome.err().map(|e| e.to_string());

    if let Err(e) = job_queue::finish(db, &job.calc_id, job_error).await {
        error!("Could not record outcome of job {}: {:?}", job.calc_id, e);
    }
    if let Err(e) = run_lock::release(db, &job.commission_month, &job.calc_id).await {
        error!(
            "Could not release lock of {} held by {}: {:?}",
            job.commission_month, job.calc_id, e
        );
    }
}
