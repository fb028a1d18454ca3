//! Rolling-window rate limiter shared by each sink across a Run.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Write quota: at most `max_ops` operations per rolling `window`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RateQuota {
    pub max_ops: u32,
    pub window: Duration,
}

impl RateQuota {
    pub fn new(max_ops: u32, window: Duration) -> Self {
        debug_assert!(max_ops > 0, "quota must allow at least one operation");
        Self { max_ops, window }
    }
}

impl Default for RateQuota {
    fn default() -> Self {
        Self {
            max_ops: 100,
            window: Duration::from_secs(60),
        }
    }
}

/// Sliding-window rate limiter.
///
/// `acquire` records the timestamps of recent acquisitions and, when the
/// window is full, sleeps until the oldest entry leaves it. Submissions are
/// delayed, never rejected; callers block on acquisition rather than
/// dropping work.
pub struct RateLimiter {
    quota: RateQuota,
    log: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(quota: RateQuota) -> Self {
        Self {
            quota,
            log: Mutex::new(VecDeque::with_capacity(quota.max_ops as usize)),
        }
    }

    /// Wait until an operation slot is free within the rolling window.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut log = self.log.lock().await;
                let now = Instant::now();
                while let Some(front) = log.front() {
                    if now.duration_since(*front) >= self.quota.window {
                        log.pop_front();
                    } else {
                        break;
                    }
                }
                if log.len() < self.quota.max_ops as usize {
                    log.push_back(now);
                    return;
                }
                // Window is full; wait for the oldest entry to expire.
                // Lock is released before sleeping.
                match log.front() {
                    Some(front) => self.quota.window - now.duration_since(*front),
                    None => Duration::ZERO,
                }
            };
            tokio::time::sleep(wait).await;
        }
    }
}
