//! Last-look strategy (Open Question #2, spec.md §9): the execution saga consults an
//! injectable decision object before honouring an LP's acceptance, rather than hard-coding a
//! rejection rule. Grounded on `risk::RiskCheck`'s generic-trait-plus-default-impl shape.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastLookDecision {
    Accept,
    Reject { reopen: bool },
}

/// Evaluates whether an LP would honour a quote acceptance under last-look. Implementations
/// model venue-specific last-look conventions (timing windows, price-drift tolerance); the
/// default is a no-op that always accepts.
pub trait LastLookStrategy: Send + Sync {
    fn evaluate(&self, quoted_at: DateTime<Utc>, accepted_at: DateTime<Utc>, quoted_price: Decimal, current_mid: Option<Decimal>) -> LastLookDecision;
}

/// Always accepts. The default strategy when a venue has no last-look window.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLastLook;

impl LastLookStrategy for NoOpLastLook {
    fn evaluate(&self, _quoted_at: DateTime<Utc>, _accepted_at: DateTime<Utc>, _quoted_price: Decimal, _current_mid: Option<Decimal>) -> LastLookDecision {
        LastLookDecision::Accept
    }
}

/// Rejects an acceptance that arrives outside `max_latency` of the quote, or whose quoted price
/// has drifted from the current mid by more than `max_price_drift`. Rejections reopen the RFQ
/// (the requester may accept another quote) rather than terminating it, matching an LP that is
/// merely protecting itself against stale quotes rather than refusing the RFQ outright.
#[derive(Debug, Clone, Copy)]
pub struct TimingDriftLastLook {
    pub max_latency: Duration,
    pub max_price_drift: Decimal,
}

impl LastLookStrategy for TimingDriftLastLook {
    fn evaluate(
        &self,
        quoted_at: DateTime<Utc>,
        accepted_at: DateTime<Utc>,
        quoted_price: Decimal,
        current_mid: Option<Decimal>,
    ) -> LastLookDecision {
        if accepted_at - quoted_at > self.max_latency {
            return LastLookDecision::Reject { reopen: true };
        }
        if let Some(mid) = current_mid {
            if (quoted_price - mid).abs() > self.max_price_drift {
                return LastLookDecision::Reject { reopen: true };
            }
        }
        LastLookDecision::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_when_acceptance_arrives_after_max_latency() {
        let strategy = TimingDriftLastLook {
            max_latency: Duration::milliseconds(200),
            max_price_drift: dec!(0.0005),
        };
        let quoted_at = Utc::now();
        let accepted_at = quoted_at + Duration::milliseconds(500);
        let decision = strategy.evaluate(quoted_at, accepted_at, dec!(1.1000), Some(dec!(1.1000)));
        assert_eq!(decision, LastLookDecision::Reject { reopen: true });
    }

    #[test]
    fn accepts_within_latency_and_drift_tolerance() {
        let strategy = TimingDriftLastLook {
            max_latency: Duration::milliseconds(200),
            max_price_drift: dec!(0.0005),
        };
        let quoted_at = Utc::now();
        let accepted_at = quoted_at + Duration::milliseconds(50);
        let decision = strategy.evaluate(quoted_at, accepted_at, dec!(1.1000), Some(dec!(1.1002)));
        assert_eq!(decision, LastLookDecision::Accept);
    }
}
