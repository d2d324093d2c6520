//! Per-user, per-tenant token-bucket rate limits (C8, spec.md §4.8). `governor`'s keyed limiter
//! gives each `(tenantId, userId)` pair its own independent bucket without a background sweep.

use std::num::NonZeroU32;

use governor::{state::keyed::DefaultKeyedStateStore, clock::DefaultClock, Quota, RateLimiter};

use crate::error::ControlError;

type KeyedLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Per-tenant-and-user token-bucket capacities.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub rfqs_per_sec: NonZeroU32,
    pub orders_per_sec: NonZeroU32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rfqs_per_sec: nonzero_ext::nonzero!(50u32),
            orders_per_sec: nonzero_ext::nonzero!(50u32),
        }
    }
}

pub struct RateLimiters {
    rfq: KeyedLimiter,
    order: KeyedLimiter,
}

impl std::fmt::Debug for RateLimiters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiters").finish_non_exhaustive()
    }
}

impl RateLimiters {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            rfq: RateLimiter::keyed(Quota::per_second(config.rfqs_per_sec)),
            order: RateLimiter::keyed(Quota::per_second(config.orders_per_sec)),
        }
    }

    fn bucket_key(tenant_id: &str, user_id: &str) -> String {
        format!("{tenant_id}:{user_id}")
    }

    pub fn check_rfq(&self, tenant_id: &str, user_id: &str) -> Result<(), ControlError> {
        let key = Self::bucket_key(tenant_id, user_id);
        self.rfq
            .check_key(&key)
            .map_err(|_| ControlError::RateLimited(format!("rfqs/sec exceeded for {key}")))
    }

    pub fn check_order(&self, tenant_id: &str, user_id: &str) -> Result<(), ControlError> {
        let key = Self::bucket_key(tenant_id, user_id);
        self.order
            .check_key(&key)
            .map_err(|_| ControlError::RateLimited(format!("orders/sec exceeded for {key}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exceeding_capacity_is_rate_limited() {
        let limiters = RateLimiters::new(RateLimitConfig {
            rfqs_per_sec: nonzero_ext::nonzero!(1u32),
            orders_per_sec: nonzero_ext::nonzero!(1u32),
        });
        assert!(limiters.check_rfq("tenant-1", "user-1").is_ok());
        assert!(limiters.check_rfq("tenant-1", "user-1").is_err());
    }

    #[test]
    fn distinct_keys_have_independent_buckets() {
        let limiters = RateLimiters::new(RateLimitConfig {
            rfqs_per_sec: nonzero_ext::nonzero!(1u32),
            orders_per_sec: nonzero_ext::nonzero!(1u32),
        });
        assert!(limiters.check_rfq("tenant-1", "user-1").is_ok());
        assert!(limiters.check_rfq("tenant-1", "user-2").is_ok());
    }
}
