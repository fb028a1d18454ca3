//! Fixed-format export timestamp.
//!
//! Checkpoints and item update times share one wire format,
//! `yyyy-MM-dd HH:mm:ss`, evaluated in the process-local time zone. The
//! format is a storage contract: existing checkpoints would need a migration
//! if it ever changed.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Wire pattern for all checkpoint and item timestamps.
const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A parsed timestamp in the fixed export format.
///
/// Stateless parse/format: safe to call from concurrent workers without any
/// locking, unlike a shared mutable formatter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Parse a wire string in `yyyy-MM-dd HH:mm:ss` form.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        NaiveDateTime::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|_| DomainError::malformed_timestamp(s))
    }

    /// Format back to the wire form.
    pub fn format(&self) -> String {
        self.0.format(FORMAT).to_string()
    }

    /// Current wall-clock time in the process-local zone, truncated to
    /// whole seconds (the wire format carries no sub-second precision).
    pub fn now() -> Self {
        use chrono::Timelike;
        let now = Local::now().naive_local();
        // Drop sub-second precision so `now().format()` parses back equal.
        Self(now.with_nanosecond(0).unwrap_or(now))
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(value: NaiveDateTime) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.format())
    }
}
