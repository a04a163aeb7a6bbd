//! Rate-limit aware retry
//!
//! Every graph service call goes through [`retry_rate_limited`]. A 429 answer
//! triggers an exponentially growing sleep (1s, 2s, 4s, ...) and another
//! attempt until the policy's stop rule fires; the last response is then
//! handed back as-is so the caller decides what a non-success status means.
//! Transport errors are never retried.

use crate::metrics;
use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Upper bound for a single backoff interval
const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Anything whose outcome can say "slow down"
pub trait RateLimited {
    fn is_rate_limited(&self) -> bool;
}

impl RateLimited for reqwest::Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
    }
}

/// When to give up retrying a rate-limited call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopRule {
    /// At most this many attempts in total
    MaxAttempts(u32),
    /// Stop before a sleep that would push the cumulative wait past this
    MaxTotalWait(Duration),
}

impl StopRule {
    /// Whether to stop after `attempts` attempts, given the cumulative wait
    /// the next sleep would reach
    fn reached(&self, attempts: u32, wait_after_next: Duration) -> bool {
        match *self {
            StopRule::MaxAttempts(max) => attempts >= max,
            StopRule::MaxTotalWait(max) => wait_after_next > max,
        }
    }
}

/// Exponential backoff policy for rate-limited calls
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// First sleep
    pub initial_interval: Duration,
    /// Growth factor between sleeps
    pub multiplier: f64,
    /// Stop rule
    pub stop: StopRule,
}

impl BackoffPolicy {
    /// Doubling backoff starting at `initial_interval`, bounded by attempt count
    pub fn attempts(max_attempts: u32, initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            stop: StopRule::MaxAttempts(max_attempts.max(1)),
        }
    }

    /// Doubling backoff starting at `initial_interval`, bounded by total wait
    pub fn wait_ceiling(max_total_wait: Duration, initial_interval: Duration) -> Self {
        Self {
            initial_interval,
            multiplier: 2.0,
            stop: StopRule::MaxTotalWait(max_total_wait),
        }
    }

    /// Interval schedule without jitter or an elapsed-time cap; stopping is
    /// decided by the stop rule alone.
    fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_randomization_factor(0.0)
            .with_multiplier(self.multiplier)
            .with_max_interval(MAX_INTERVAL)
            .with_max_elapsed_time(None)
            .build()
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::attempts(4, Duration::from_secs(1))
    }
}

/// Blocking wait between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeper backed by tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Run `operation` until it is not rate limited or the policy stops it.
///
/// Returns the last outcome, which may itself be rate limited. Errors from
/// `operation` are returned immediately.
pub async fn retry_rate_limited<T, E, F, Fut>(
    policy: &BackoffPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
) -> Result<T, E>
where
    T: RateLimited,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut schedule = policy.schedule();
    let mut attempts = 0u32;
    let mut waited = Duration::ZERO;

    loop {
        let outcome = operation().await?;
        attempts += 1;

        if !outcome.is_rate_limited() {
            return Ok(outcome);
        }

        let delay = match schedule.next_backoff() {
            Some(delay) if !policy.stop.reached(attempts, waited + delay) => delay,
            _ => {
                metrics::record_rate_limited(None);
                warn!(
                    attempts,
                    waited_secs = waited.as_secs_f64(),
                    "Still rate limited, giving up"
                );
                return Ok(outcome);
            }
        };

        metrics::record_rate_limited(Some(delay.as_secs_f64()));
        debug!(
            attempt = attempts,
            delay_ms = delay.as_millis() as u64,
            "Rate limited, backing off"
        );

        sleeper.sleep(delay).await;
        waited += delay;
    }
}
