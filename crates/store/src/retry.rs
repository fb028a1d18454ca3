//! Transient-error retry with a fixed delay schedule.

use std::time::Duration;

use tracing::{error, warn};

use crate::error::StoreError;

/// Retry schedule for transient store errors.
///
/// The delay for attempt `k` (0-based) is `delays[min(k, delays.len() - 1)]`:
/// the list's tail value repeats once the schedule is exhausted.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Ordered delay list; must be non-empty.
    pub delays: Vec<Duration>,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: vec![
                Duration::from_secs(60),
                Duration::from_secs(180),
                Duration::from_secs(360),
            ],
        }
    }
}

impl RetrySchedule {
    pub fn new(max_retries: u32, delays: Vec<Duration>) -> Self {
        debug_assert!(!delays.is_empty(), "delay schedule must be non-empty");
        Self {
            max_retries,
            delays,
        }
    }

    /// Schedule that never retries (tests, opt-out call sites).
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            delays: vec![Duration::ZERO],
        }
    }

    /// Delay before re-running attempt `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let idx = attempt.min(self.delays.len().saturating_sub(1));
        self.delays.get(idx).copied().unwrap_or(Duration::ZERO)
    }
}

/// Run `operation`, retrying transient [`StoreError`]s per the schedule.
///
/// Non-transient errors, and transient errors after the final attempt,
/// propagate to the caller unchanged.
pub async fn retry<F, Fut, T>(schedule: &RetrySchedule, mut operation: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt, "store operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if !err.is_transient() => {
                warn!(error = %err, "non-transient store error, failing immediately");
                return Err(err);
            }
            Err(err) if attempt >= schedule.max_retries => {
                error!(attempt, error = %err, "store operation failed after max retries");
                return Err(err);
            }
            Err(err) => {
                let delay = schedule.delay_for_attempt(attempt as usize);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient store error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
