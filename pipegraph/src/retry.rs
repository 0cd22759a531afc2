//! Retry policy: bounded exponential backoff with jitter around node invocations.
//!
//! Which errors are transient is decided by an injected predicate, so the policy
//! knows nothing about provider error types. The default predicate retries
//! [`NodeError::RateLimited`] only.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::NodeError;
use crate::graph::logging;

/// Classifies a node error as retryable.
pub type RetryPredicate = Arc<dyn Fn(&NodeError) -> bool + Send + Sync>;

/// Bounded exponential backoff with optional jitter plus a retry-eligibility predicate.
///
/// Immutable once built; one instance may be shared by every node of a compiled
/// pipeline or overridden per node.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first one. Values below 1 behave as 1.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_interval: Duration,
    /// Multiplier applied to the delay after each attempt.
    pub backoff_factor: f64,
    /// Upper bound for any single delay (before jitter).
    pub max_interval: Duration,
    /// Scale each delay by a random factor in `[0.5, 1.5]`.
    pub jitter: bool,
    retry_on: RetryPredicate,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_interval: Duration::from_millis(500),
            backoff_factor: 2.0,
            max_interval: Duration::from_secs(128),
            jitter: true,
            retry_on: Arc::new(NodeError::is_rate_limited),
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("initial_interval", &self.initial_interval)
            .field("backoff_factor", &self.backoff_factor)
            .field("max_interval", &self.max_interval)
            .field("jitter", &self.jitter)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::default().with_max_attempts(1)
    }

    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    #[must_use]
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    #[must_use]
    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replaces the retry-eligibility predicate.
    #[must_use]
    pub fn retry_on<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&NodeError) -> bool + Send + Sync + 'static,
    {
        self.retry_on = Arc::new(predicate);
        self
    }

    /// Whether `error` may be retried under this policy.
    pub fn is_retryable(&self, error: &NodeError) -> bool {
        (self.retry_on)(error)
    }

    /// Effective attempt budget (never below 1).
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay after failed attempt `attempt` (1-indexed), without jitter:
    /// `min(initial_interval * backoff_factor^(attempt - 1), max_interval)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.backoff_factor.max(0.0).powi(exponent);
        let nanos = self.initial_interval.as_nanos() as f64 * factor;
        if !nanos.is_finite() || nanos >= self.max_interval.as_nanos() as f64 {
            return self.max_interval;
        }
        Duration::from_nanos(nanos.max(0.0).round() as u64)
    }

    /// Delay after failed attempt `attempt`, with jitter applied when enabled.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = self.delay_for_attempt(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let scale: f64 = rand::thread_rng().gen_range(0.5..=1.5);
        Duration::try_from_secs_f64(delay.as_secs_f64() * scale).unwrap_or(Duration::MAX)
    }
}

/// Final failure of [`execute_with_retry`]: the last error, unchanged, and how many
/// attempts were made.
#[derive(Debug)]
pub struct RetryFailure {
    pub error: NodeError,
    pub attempts: u32,
}

/// Runs `operation` under `policy`.
///
/// Retries while the error is retryable and fewer than `max_attempts` attempts were
/// made, sleeping [`RetryPolicy::backoff`] between attempts. Non-retryable errors
/// return after the attempt that raised them. `label` is used for logging only.
pub async fn execute_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RetryFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NodeError>>,
{
    let budget = policy.attempt_budget();
    let mut attempt = 0;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= budget || !policy.is_retryable(&error) {
                    return Err(RetryFailure {
                        error,
                        attempts: attempt,
                    });
                }
                let delay = policy.backoff(attempt);
                logging::log_retry(label, attempt, budget, delay, &error);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
