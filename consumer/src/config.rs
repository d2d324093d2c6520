use std::time::Duration;

/// Per-consumer-group configuration. Defaults match spec.md §4.3's retry schedule.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Identifies this consumer in the processed-event dedup key and DLQ rows.
    pub consumer_group: String,
    /// A free-form version tag recorded on DLQ rows, so operators can tell which build of the
    /// handler produced a given dead letter.
    pub consumer_version: String,
    /// Fixed retry backoff schedule for transient failures: 0.5s, 1s, 2s, 5s, 10s by default.
    /// The handler is retried once per entry; once the schedule is exhausted the event is
    /// routed to the DLQ.
    pub retry_backoff: Vec<Duration>,
    /// How long to wait for an out-of-order predecessor sequence before treating a gap as lost
    /// and routing the event to the DLQ (spec.md §4.3 "Ordering").
    pub gap_wait: Duration,
}

impl ConsumerConfig {
    pub fn new(consumer_group: impl Into<String>, consumer_version: impl Into<String>) -> Self {
        Self {
            consumer_group: consumer_group.into(),
            consumer_version: consumer_version.into(),
            retry_backoff: default_retry_backoff(),
            gap_wait: Duration::from_secs(2),
        }
    }
}

fn default_retry_backoff() -> Vec<Duration> {
    [500u64, 1_000, 2_000, 5_000, 10_000]
        .into_iter()
        .map(Duration::from_millis)
        .collect()
}
