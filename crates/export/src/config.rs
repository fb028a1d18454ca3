//! Export pipeline configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use cartfeed_store::RetrySchedule;

use crate::limiter::RateQuota;

/// Fatal configuration error at process startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The scheduling period is required; there is no sensible default.
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime configuration for the export pipeline.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scheduler period between Runs.
    pub period: Duration,
    /// Bounded worker pool size for per-item processing within a Run.
    pub workers: usize,
    /// Per-sink write quota, shared across a whole Run.
    pub sink_quota: RateQuota,
    /// Transient-error retry schedule for the storage gateway.
    pub retry: RetrySchedule,
    /// Root directory for file-based sinks.
    pub out_dir: PathBuf,
}

impl ExportConfig {
    /// Read configuration from `CARTFEED_*` environment variables.
    ///
    /// `CARTFEED_EXPORT_PERIOD_MS` is required; everything else defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let period_ms = require_ms("CARTFEED_EXPORT_PERIOD_MS")?;
        let workers = optional_parsed("CARTFEED_WORKERS", 4usize)?;
        let max_ops = optional_parsed("CARTFEED_SINK_MAX_OPS", 100u32)?;
        let window_ms = optional_parsed("CARTFEED_SINK_WINDOW_MS", 60_000u64)?;

        // Zero is never a usable value for any of these: a zero period
        // panics the interval, zero workers stall the pool, and a zero
        // quota or window turns every sink write into an endless wait.
        reject_zero("CARTFEED_EXPORT_PERIOD_MS", period_ms as u128)?;
        reject_zero("CARTFEED_WORKERS", workers as u128)?;
        reject_zero("CARTFEED_SINK_MAX_OPS", max_ops as u128)?;
        reject_zero("CARTFEED_SINK_WINDOW_MS", window_ms as u128)?;

        let period = Duration::from_millis(period_ms);
        let sink_quota = RateQuota::new(max_ops, Duration::from_millis(window_ms));
        let retry = RetrySchedule::new(
            optional_parsed("CARTFEED_RETRY_MAX", 3u32)?,
            parse_delay_list(
                "CARTFEED_RETRY_DELAYS_MS",
                &std::env::var("CARTFEED_RETRY_DELAYS_MS")
                    .unwrap_or_else(|_| "60000,180000,360000".to_string()),
            )?,
        );
        let out_dir = std::env::var("CARTFEED_OUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("export"));

        Ok(Self {
            period,
            workers,
            sink_quota,
            retry,
            out_dir,
        })
    }
}

fn reject_zero(key: &'static str, value: u128) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
        });
    }
    Ok(())
}

fn require_ms(key: &'static str) -> Result<u64, ConfigError> {
    let raw = std::env::var(key).map_err(|_| ConfigError::Missing(key))?;
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value: raw })
}

fn optional_parsed<T: std::str::FromStr>(
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

/// Parse a comma-separated millisecond list, e.g. `60000,180000,360000`.
fn parse_delay_list(key: &'static str, raw: &str) -> Result<Vec<Duration>, ConfigError> {
    let delays = raw
        .split(',')
        .map(|part| part.trim().parse::<u64>().map(Duration::from_millis))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ConfigError::Invalid {
            key,
            value: raw.to_string(),
        })?;
    if delays.is_empty() {
        return Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        });
    }
    Ok(delays)
}

/// Serializes tests that mutate process-global environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
