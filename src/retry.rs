use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::RetrySettings;

pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a>>;

/// Waits between attempts. Swapped out in tests so retries run without real delays.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> SleepFuture<'_>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// One backoff time unit; the wait after attempt `k` is `base_delay * (2^k + jitter)`.
    pub base_delay: Duration,
    pub max_total_wait: Option<Duration>,
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay: Duration::from_millis(settings.base_delay_ms),
            max_total_wait: settings.max_total_wait_secs.map(Duration::from_secs),
        }
    }
}

/// Outcome of a failed [`with_retry`] run. Both variants carry the last error untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The predicate rejected the failure, so no further attempt was made.
    Permanent(E),
    /// Every allowed attempt failed with a retry-worthy error.
    Exhausted { attempts: u32, last_error: E },
}

/// Wait before the attempt following 0-based attempt `attempt`. `jitter` must lie in `[0, 1)`.
pub fn backoff_delay(base_delay: Duration, attempt: u32, jitter: f64) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let secs = base_delay.as_secs_f64() * (2f64.powi(exponent) + jitter);
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

/// Runs `operation` until it succeeds, returns an error `should_retry` rejects,
/// or the policy runs out of attempts or total wait budget.
pub async fn with_retry<T, E, S, P, F, Fut>(
    policy: &RetryPolicy,
    sleeper: &S,
    mut should_retry: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    S: Sleeper + ?Sized,
    P: FnMut(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut waited = Duration::ZERO;
    let mut attempt = 0;

    loop {
        let err = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !should_retry(&err) {
            return Err(RetryError::Permanent(err));
        }
        if attempt + 1 >= max_attempts {
            return Err(RetryError::Exhausted {
                attempts: attempt + 1,
                last_error: err,
            });
        }

        let delay = backoff_delay(policy.base_delay, attempt, rand::random::<f64>());
        if let Some(budget) = policy.max_total_wait
            && waited + delay > budget
        {
            info!(
                attempt = attempt + 1,
                waited_secs = waited.as_secs_f64(),
                budget_secs = budget.as_secs_f64(),
                error = %err,
                "retry wait budget exhausted"
            );
            return Err(RetryError::Exhausted {
                attempts: attempt + 1,
                last_error: err,
            });
        }

        warn!(
            attempt = attempt + 1,
            wait_secs = delay.as_secs_f64(),
            error = %err,
            "attempt failed, retrying"
        );
        sleeper.sleep(delay).await;
        waited += delay;
        attempt += 1;
    }
}
