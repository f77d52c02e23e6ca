use crate::core::config::ConfigError;
use crate::core::errors::{BtcMarketsError, Result};
use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use nonzero_ext::nonzero;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

type DirectLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Token bucket shape: up to `capacity` permits banked, one permit restored
/// every `refill_interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    capacity: NonZeroU32,
    refill_interval: Duration,
    quota: Quota,
}

impl RateLimitPolicy {
    pub fn new(capacity: u32, refill_interval: Duration) -> std::result::Result<Self, ConfigError> {
        let capacity = NonZeroU32::new(capacity).ok_or_else(|| {
            ConfigError::InvalidConfiguration("rate limit capacity must be positive".to_string())
        })?;
        let quota = Quota::with_period(refill_interval)
            .ok_or_else(|| {
                ConfigError::InvalidConfiguration(
                    "rate limit refill interval must be positive".to_string(),
                )
            })?
            .allow_burst(capacity);

        Ok(Self {
            capacity,
            refill_interval,
            quota,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity.get()
    }

    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }
}

impl Default for RateLimitPolicy {
    /// 50 permits, one restored every ten seconds.
    fn default() -> Self {
        let capacity = nonzero!(50u32);
        Self {
            capacity,
            refill_interval: Duration::from_secs(10),
            quota: Quota::per_minute(nonzero!(6u32)).allow_burst(capacity),
        }
    }
}

/// Client-wide request limiter.
///
/// Shared behind an `Arc` so several clients can draw from one budget.
pub struct RateLimiter {
    policy: RateLimitPolicy,
    limiter: DirectLimiter,
}

impl RateLimiter {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            limiter: GovernorRateLimiter::direct(policy.quota),
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Take a permit without waiting.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait for a permit, giving up with [`BtcMarketsError::Cancelled`] as soon
    /// as `cancel` fires. No permit is consumed on cancellation.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(BtcMarketsError::Cancelled);
        }
        if self.try_acquire() {
            return Ok(());
        }

        debug!(
            capacity = self.policy.capacity(),
            refill_ms = self.policy.refill_interval.as_millis() as u64,
            "Rate limit exhausted, waiting for a permit"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(BtcMarketsError::Cancelled),
            () = self.limiter.until_ready() => Ok(()),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitPolicy::default())
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn policy_rejects_zero_values() {
        assert!(RateLimitPolicy::new(0, Duration::from_secs(1)).is_err());
        assert!(RateLimitPolicy::new(5, Duration::ZERO).is_err());

        let policy = RateLimitPolicy::new(5, Duration::from_millis(250)).unwrap();
        assert_eq!(policy.capacity(), 5);
        assert_eq!(policy.refill_interval(), Duration::from_millis(250));
    }

    #[test]
    fn default_policy_matches_exchange_budget() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.capacity(), 50);
        assert_eq!(policy.refill_interval(), Duration::from_secs(10));
        assert_eq!(
            policy,
            RateLimitPolicy::new(50, Duration::from_secs(10)).unwrap()
        );
    }

    #[test]
    fn burst_is_bounded_by_capacity() {
        let limiter = RateLimiter::new(RateLimitPolicy::new(3, Duration::from_secs(60)).unwrap());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn call_past_capacity_waits_one_interval() {
        let interval = Duration::from_millis(300);
        let cancel = CancellationToken::new();

        let start = Instant::now();
        let limiter = RateLimiter::new(RateLimitPolicy::new(2, interval).unwrap());
        limiter.wait(&cancel).await.unwrap();
        limiter.wait(&cancel).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(100));

        limiter.wait(&cancel).await.unwrap();
        assert!(start.elapsed() >= interval);
    }

    #[tokio::test]
    async fn wait_is_cancellable() {
        let limiter = RateLimiter::new(RateLimitPolicy::new(1, Duration::from_secs(60)).unwrap());
        let cancel = CancellationToken::new();
        limiter.wait(&cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let result = limiter.wait(&cancel).await;
        assert!(matches!(result, Err(BtcMarketsError::Cancelled)));
    }

    #[tokio::test]
    async fn cancelled_token_fails_even_with_permits_left() {
        let limiter = RateLimiter::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(limiter.wait(&cancel).await.unwrap_err().is_cancelled());
        assert!(limiter.try_acquire());
    }
}
