//! Outbox relay configuration. Defaults match the Trading Event Core's published contract for
//! the outbox writer/relay (C2): base backoff 500ms, factor 2, cap 10s, 10 retries before a row
//! is routed to the dead-letter table.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// How often the relay polls for unpublished rows when the previous poll found nothing.
    pub poll_interval: Duration,
    /// Maximum number of rows claimed per poll (`FOR UPDATE SKIP LOCKED` batch size).
    pub batch_size: i64,
    /// Base delay before the first retry of a failed publish.
    pub backoff_base: Duration,
    /// Multiplier applied to the backoff after each failed attempt.
    pub backoff_factor: u32,
    /// Ceiling on the computed backoff, regardless of retry count.
    pub backoff_cap: Duration,
    /// Number of failed publish attempts after which a row is routed to the dead-letter table.
    pub max_retries: i32,
    /// `consumerGroup` recorded on dead-lettered rows.
    pub dlq_consumer_group: &'static str,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            batch_size: 100,
            backoff_base: Duration::from_millis(500),
            backoff_factor: 2,
            backoff_cap: Duration::from_secs(10),
            max_retries: 10,
            dlq_consumer_group: "outbox-relay",
        }
    }
}

/// Computes the exponential backoff for a given retry count, honouring `base`, `factor` and
/// `cap`. `retry_count` is the number of attempts already made (0 before the first retry).
pub fn calculate_backoff(base: Duration, factor: u32, cap: Duration, retry_count: i32) -> Duration {
    let shift = retry_count.clamp(0, 32) as u32;
    let multiplier = factor.saturating_pow(shift);
    base.saturating_mul(multiplier).min(cap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_capped() {
        let base = Duration::from_millis(500);
        let cap = Duration::from_secs(10);
        assert_eq!(calculate_backoff(base, 2, cap, 0), Duration::from_millis(500));
        assert_eq!(calculate_backoff(base, 2, cap, 1), Duration::from_millis(1000));
        assert_eq!(calculate_backoff(base, 2, cap, 2), Duration::from_millis(2000));
        assert_eq!(calculate_backoff(base, 2, cap, 10), cap);
    }
}
