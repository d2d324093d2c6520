//! Seed end-to-end scenario 6 (spec.md §8): a feed goes quiet for 6s past the default 5s
//! staleness threshold, then a fresh tick flips `stale` back to false. Uses synthetic timestamps
//! rather than real sleeps, matching `orion_marketdata`'s own staleness unit tests.

use chrono::Utc;
use orion_core::context::Correlation;
use orion_marketdata::StalenessTracker;

#[test]
fn stale_feed_is_flagged_then_resumes() {
    let correlation = Correlation::root("t1");
    let mut tracker = StalenessTracker::new(chrono::Duration::seconds(5));
    let t0 = Utc::now();

    tracker.record_tick(&correlation, "EURUSD", "primary", t0);

    let still_fresh = tracker.scan(&correlation, t0 + chrono::Duration::seconds(3));
    assert!(still_fresh.is_empty(), "under threshold must not flag stale");

    let six_seconds_later = t0 + chrono::Duration::seconds(6);
    let stale_events = tracker.scan(&correlation, six_seconds_later);
    assert_eq!(stale_events.len(), 1);
    assert!(stale_events[0].payload.stale);
    assert_eq!(stale_events[0].entity.entity_id, "EURUSD:primary");

    let resumption = tracker
        .record_tick(&correlation, "EURUSD", "primary", six_seconds_later + chrono::Duration::milliseconds(100))
        .expect("transitioning out of stale must emit a resumption event");
    assert!(!resumption.payload.stale);
}
