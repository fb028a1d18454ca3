//! Periodic, non-overlapping Run scheduling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use cartfeed_store::{CheckpointStore, ItemStore};

use crate::run::Pipeline;

/// Drives a [`Pipeline`] on a fixed period.
///
/// Runs never overlap: the ticker fires only between Runs, and ticks that
/// elapse while a Run is in progress are skipped rather than queued. A slow
/// Run therefore delays the next one instead of stacking up behind it.
pub struct ExportScheduler<S> {
    pipeline: Pipeline<S>,
    period: Duration,
}

impl<S> ExportScheduler<S>
where
    S: ItemStore + CheckpointStore + 'static,
{
    pub fn new(pipeline: Pipeline<S>, period: Duration) -> Self {
        Self { pipeline, period }
    }

    /// Spawn the scheduling loop. The first Run fires one period from now.
    pub fn start(self) -> SchedulerHandle {
        let shutdown = Arc::new(Notify::new());
        let notify = Arc::clone(&shutdown);
        let period = self.period;
        let pipeline = self.pipeline;

        let join = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(period_ms = period.as_millis() as u64, "export scheduler started");

            'scheduler: loop {
                tokio::select! {
                    _ = notify.notified() => break 'scheduler,
                    _ = ticker.tick() => {
                        // Shutdown mid-Run cancels the Run; dropping the
                        // future aborts in-flight items before their commit.
                        tokio::select! {
                            _ = notify.notified() => break 'scheduler,
                            result = pipeline.run_once() => match result {
                                Ok(report) => info!(
                                    exported = report.exported,
                                    failed = report.failed,
                                    "scheduled run complete"
                                ),
                                Err(err) => error!(error = %err, "scheduled run aborted"),
                            }
                        }
                    }
                }
            }
            info!("export scheduler stopped");
        });

        SchedulerHandle { shutdown, join }
    }
}

/// Handle to a running scheduler.
pub struct SchedulerHandle {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request shutdown and wait for the scheduling loop to exit.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        let _ = self.join.await;
    }
}
