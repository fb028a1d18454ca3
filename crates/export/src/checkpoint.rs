//! Checkpoint map snapshot for a Run.

use tracing::warn;

use cartfeed_core::{Checkpoint, CheckpointMap, Timestamp};

/// Build the parsed checkpoint snapshot from raw checkpoint documents.
///
/// Loading never fails fatally: an unparsable `lastProcessTs` is logged and
/// the entry dropped, so the item behaves as "never processed" and stays
/// eligible. An empty input yields an empty map, which makes every item
/// eligible downstream.
pub fn build_checkpoint_map(checkpoints: Vec<Checkpoint>) -> CheckpointMap {
    let total = checkpoints.len();
    let mut map = CheckpointMap::with_capacity(total);

    for checkpoint in checkpoints {
        match Timestamp::parse(&checkpoint.last_process_ts) {
            Ok(ts) => {
                map.insert(checkpoint.item_id, ts);
            }
            Err(_) => {
                warn!(
                    item_id = %checkpoint.item_id,
                    last_process_ts = %checkpoint.last_process_ts,
                    "dropping checkpoint with unparsable timestamp"
                );
            }
        }
    }

    tracing::debug!(loaded = total, usable = map.len(), "checkpoint map built");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartfeed_core::ItemId;

    #[test]
    fn empty_input_yields_empty_map() {
        assert!(build_checkpoint_map(Vec::new()).is_empty());
    }

    #[test]
    fn unparsable_entries_are_dropped_not_fatal() {
        let map = build_checkpoint_map(vec![
            Checkpoint::new("a", "2024-01-01 00:00:00"),
            Checkpoint::new("b", "not-a-timestamp"),
            Checkpoint::new("c", "2024-02-01 12:30:00"),
        ]);

        assert_eq!(map.len(), 2);
        assert!(map.contains_key(&ItemId::new("a")));
        assert!(!map.contains_key(&ItemId::new("b")));
        assert!(map.contains_key(&ItemId::new("c")));
    }
}
