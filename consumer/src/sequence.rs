//! Per-partition sequence gap detection (spec.md §4.3 "Ordering").
//!
//! An entity's `entity.sequence` is monotonic within its partition. This tracker remembers the
//! last sequence applied per `(entityType, entityId)` so the runtime can detect a gap and wait
//! (bounded) before treating it as lost.

use std::{collections::HashMap, sync::Mutex};

#[derive(Debug)]
pub enum SequencePosition {
    InOrder,
    Gap { expected: u64, got: u64 },
}

#[derive(Debug, Default)]
pub struct SequenceTracker {
    last_seen: Mutex<HashMap<(String, String), u64>>,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether `sequence` is the expected next value for this entity. Does not mutate
    /// state when a gap is found, so the caller can re-check after waiting.
    pub fn check(&self, entity_type: &str, entity_id: &str, sequence: u64) -> SequencePosition {
        let map = self.last_seen.lock().unwrap();
        match map.get(&(entity_type.to_owned(), entity_id.to_owned())) {
            Some(&last) if sequence <= last => SequencePosition::InOrder,
            Some(&last) if sequence == last + 1 => SequencePosition::InOrder,
            Some(&last) => SequencePosition::Gap {
                expected: last + 1,
                got: sequence,
            },
            None => SequencePosition::InOrder,
        }
    }

    /// Records that `sequence` has now been applied for this entity.
    pub fn advance(&self, entity_type: &str, entity_id: &str, sequence: u64) {
        let mut map = self.last_seen.lock().unwrap();
        map.insert((entity_type.to_owned(), entity_id.to_owned()), sequence);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_gap_and_accepts_after_advance() {
        let tracker = SequenceTracker::new();
        tracker.advance("Order", "o-1", 5);
        assert!(matches!(
            tracker.check("Order", "o-1", 7),
            SequencePosition::Gap { expected: 6, got: 7 }
        ));
        assert!(matches!(
            tracker.check("Order", "o-1", 6),
            SequencePosition::InOrder
        ));
    }

    #[test]
    fn duplicate_or_stale_sequence_is_in_order_not_a_gap() {
        let tracker = SequenceTracker::new();
        tracker.advance("Order", "o-1", 5);
        assert!(matches!(
            tracker.check("Order", "o-1", 3),
            SequencePosition::InOrder
        ));
    }
}
