//! Change detection: which items are due for export.

use tracing::{debug, warn};

use cartfeed_core::{CheckpointMap, Item, Timestamp};

/// Outcome of the authoritative per-item eligibility test.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// No checkpoint, or updated strictly after the checkpoint.
    Eligible,
    /// Not changed since the last successful export.
    NotEligible,
    /// Missing or unparsable `lastUpdateDate`; fail-closed, never exported
    /// this Run and never counted as changed (prevents reprocessing storms
    /// on malformed data).
    Malformed,
}

/// Lower bound for the store's time filter: the minimum checkpoint
/// timestamp, or `None` (unfiltered) when no checkpoints exist.
///
/// This is an optimization only; the filter may over-select, and
/// [`eligibility`] remains the authoritative test on every fetched item.
pub fn query_lower_bound(checkpoints: &CheckpointMap) -> Option<Timestamp> {
    checkpoints.values().min().copied()
}

/// The authoritative per-item test.
pub fn eligibility(item: &Item, checkpoints: &CheckpointMap) -> Eligibility {
    let raw = match item.last_update_date.as_deref() {
        Some(raw) => raw,
        None => return Eligibility::Malformed,
    };
    let updated = match Timestamp::parse(raw) {
        Ok(ts) => ts,
        Err(_) => return Eligibility::Malformed,
    };

    match checkpoints.get(&item.id) {
        None => Eligibility::Eligible,
        Some(checkpoint) if updated > *checkpoint => Eligibility::Eligible,
        Some(_) => Eligibility::NotEligible,
    }
}

/// Result of filtering a fetched item set.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub eligible: Vec<Item>,
    pub not_eligible: usize,
    pub malformed: usize,
}

/// Apply [`eligibility`] to every fetched item, logging skips.
pub fn filter_eligible(items: Vec<Item>, checkpoints: &CheckpointMap) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    for item in items {
        match eligibility(&item, checkpoints) {
            Eligibility::Eligible => outcome.eligible.push(item),
            Eligibility::NotEligible => {
                debug!(item_id = %item.id, "skipping item: not changed since checkpoint");
                outcome.not_eligible += 1;
            }
            Eligibility::Malformed => {
                warn!(
                    item_id = %item.id,
                    last_update_date = ?item.last_update_date,
                    "skipping item: missing or malformed lastUpdateDate"
                );
                outcome.malformed += 1;
            }
        }
    }

    outcome
}
