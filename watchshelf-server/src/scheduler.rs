use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use watchshelf_config::ScheduleConfig;
use watchshelf_core::{ImportJob, ImportResult};

/// Runs the import job every `interval`, the first time one interval after
/// start. Each run gets a child of the shutdown token and is cancelled once
/// it exceeds `max_runtime`.
#[derive(Debug, Clone)]
pub struct ImportScheduler {
    job: Arc<ImportJob>,
    interval: Duration,
    max_runtime: Duration,
}

impl ImportScheduler {
    pub fn new(job: ImportJob, interval: Duration, max_runtime: Duration) -> Self {
        Self {
            job: Arc::new(job),
            interval,
            max_runtime,
        }
    }

    /// `None` when scheduled imports are switched off.
    pub fn from_config(job: ImportJob, schedule: &ScheduleConfig) -> Option<Self> {
        if !schedule.enabled || schedule.interval.is_zero() {
            info!("Scheduled imports disabled");
            return None;
        }
        Some(Self::new(job, schedule.interval, schedule.max_runtime))
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval = ?self.interval, max_runtime = ?self.max_runtime, "Import scheduler started");

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Import scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {}
            }

            self.run_once(&shutdown).await;
        }
    }

    /// One bounded job run.
    pub async fn run_once(&self, shutdown: &CancellationToken) -> Option<ImportResult> {
        let cancel = shutdown.child_token();
        let progress = |percent: f64| debug!(percent, "Scheduled import progress");

        let run = self.job.run(&progress, &cancel);
        tokio::pin!(run);

        tokio::select! {
            result = &mut run => result,
            _ = tokio::time::sleep(self.max_runtime) => {
                warn!(max_runtime = ?self.max_runtime, "Scheduled import exceeded its runtime, cancelling");
                cancel.cancel();
                run.await
            }
        }
    }
}
