//! Token-bucket cooldown: `amount` uses per `per`, one bucket per key.
//!
//! The key is the command name plus a value extracted from the invocation
//! context (user id, channel id, ...). Buckets live in a `DashMap`, so
//! concurrent invocations for different keys never contend on one lock.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use tracing::debug;

use crate::domain::cooldown::{BucketType, CooldownOutcome};
use crate::error::{ConfigurationError, PolicyFault};
use crate::ports::outbound::{CooldownPolicy, GateContext, PolicyInvocation};

type KeyExtractor<C> = Box<dyn Fn(&C) -> Option<String> + Send + Sync>;

/// Token bucket entry for one key
struct TokenBucket {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    /// Last access time (for cleanup)
    last_access: Instant,
}

impl TokenBucket {
    fn new(quota: Quota) -> Self {
        Self {
            limiter: RateLimiter::direct(quota),
            last_access: Instant::now(),
        }
    }

    fn check(&mut self) -> Result<(), Duration> {
        self.last_access = Instant::now();
        match self.limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                Err(wait)
            }
        }
    }
}

/// Cooldown allowing `amount` invocations per `per` for each key.
pub struct RateLimitCooldown<C> {
    name: String,
    bucket_type: BucketType,
    quota: Quota,
    key: KeyExtractor<C>,
    buckets: DashMap<(String, String), TokenBucket>,
}

impl<C: GateContext> RateLimitCooldown<C> {
    /// Create a cooldown keyed by `key`.
    ///
    /// A key of `None` means the bucket does not apply to that context.
    pub fn new<F>(
        amount: u32,
        per: Duration,
        bucket_type: impl Into<BucketType>,
        key: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: Fn(&C) -> Option<String> + Send + Sync + 'static,
    {
        let burst = NonZeroU32::new(amount).ok_or_else(|| {
            ConfigurationError::InvalidConfig("cooldown amount cannot be 0".into())
        })?;
        let quota = Quota::with_period(per / amount)
            .ok_or(ConfigurationError::NonPositiveRetryAfter)?
            .allow_burst(burst);
        let bucket_type = bucket_type.into();

        Ok(Self {
            name: format!("cooldown:{bucket_type}"),
            bucket_type,
            quota,
            key: Box::new(key),
            buckets: DashMap::new(),
        })
    }

    /// One bucket shared by every context.
    pub fn global(
        amount: u32,
        per: Duration,
        bucket_type: impl Into<BucketType>,
    ) -> Result<Self, ConfigurationError> {
        Self::new(amount, per, bucket_type, |_: &C| Some(String::new()))
    }

    /// Override the policy name used in fault reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Consume one use for `key` under `command`.
    ///
    /// Returns the wait until the next use is allowed when the bucket is empty.
    pub fn check(&self, command: &str, key: String) -> Result<(), Duration> {
        let mut bucket = self
            .buckets
            .entry((command.to_owned(), key))
            .or_insert_with(|| {
                debug!(command = %command, "Creating new cooldown bucket");
                TokenBucket::new(self.quota)
            });
        bucket.check()
    }

    /// Clean up old buckets (call periodically)
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.buckets.retain(|(command, key), bucket| {
            let age = now.duration_since(bucket.last_access);
            if age >= max_age {
                debug!(
                    command = %command,
                    key = %key,
                    age_secs = age.as_secs(),
                    "Removing stale cooldown bucket"
                );
                false
            } else {
                true
            }
        });
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[async_trait]
impl<C: GateContext> CooldownPolicy<C> for RateLimitCooldown<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn bucket_type(&self) -> &BucketType {
        &self.bucket_type
    }

    async fn evaluate(
        &self,
        invocation: &PolicyInvocation<'_, C>,
    ) -> Result<CooldownOutcome, PolicyFault> {
        let Some(key) = (self.key)(invocation.context) else {
            return Ok(CooldownOutcome::none());
        };

        match self.check(invocation.command.name(), key) {
            Ok(()) => Ok(CooldownOutcome::none()),
            Err(wait) if wait.is_zero() => Ok(CooldownOutcome::none()),
            Err(wait) => CooldownOutcome::on_cooldown(self.bucket_type.clone(), wait)
                .map_err(PolicyFault::from_error),
        }
    }
}

/// Background task to clean up stale cooldown buckets
pub async fn cleanup_task<C: GateContext>(cooldown: Arc<RateLimitCooldown<C>>, interval: Duration, max_age: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        cooldown.cleanup(max_age);
    }
}
