use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::cancel::CancelToken;
use crate::types::{PipelineError, Result};

/// How a failed attempt should be treated by [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worth another attempt after an exponential delay.
    Transient,
    /// Provider-signaled backpressure, with the advertised wait if any.
    RateLimited(Option<Duration>),
    /// Retrying cannot help.
    Fatal,
}

/// Bounded retry budget shared by every provider call.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Wait applied on backpressure when the provider does not advertise one.
    pub rate_limit_wait: Duration,
    /// Linear penalty added on top of a backpressure wait per elapsed retry.
    pub rate_limit_penalty: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            rate_limit_wait: Duration::from_secs(10),
            rate_limit_penalty: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    fn schedule(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.initial_delay,
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

/// Run `op`, retrying failed attempts according to `policy`.
///
/// `classify` decides whether an error is transient, backpressure or fatal.
/// At most `max_retries` retries are performed and every delay is capped at
/// `max_delay`, so the total wait is bounded. The last error is returned
/// once the budget is exhausted.
pub async fn with_retry<T, F, Fut, C>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    classify: C,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    C: Fn(&PipelineError) -> FailureKind,
{
    let mut schedule = policy.schedule();
    let mut attempt: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_retries {
                    return Err(err);
                }
                let delay = match classify(&err) {
                    FailureKind::Fatal => return Err(err),
                    FailureKind::Transient => {
                        schedule.next_backoff().unwrap_or(policy.max_delay)
                    }
                    FailureKind::RateLimited(advertised) => {
                        let base = advertised.unwrap_or(policy.rate_limit_wait);
                        base + policy.rate_limit_penalty * attempt
                    }
                };
                attempt += 1;
                warn!(
                    "Attempt {} failed ({}), retrying in {:?}",
                    attempt, err, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
