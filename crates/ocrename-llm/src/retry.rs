//! Bounded retry with increasing backoff for provider calls

use crate::LlmError;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

/// How often and how patiently a provider call is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Base delay after a transient failure, multiplied by the attempt number
    pub backoff: Duration,

    /// Base delay after a rate-limit response, multiplied by the attempt number
    pub rate_limit_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(3),
            rate_limit_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Policy that tries once and never sleeps
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
            rate_limit_backoff: Duration::ZERO,
        }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32, err: &LlmError) -> Duration {
        let base = match err {
            LlmError::RateLimited => self.rate_limit_backoff,
            _ => self.backoff,
        };
        base * attempt
    }

    /// Run `op` until it succeeds, fails terminally or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. Authentication and other
    /// non-transient errors end the loop immediately.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if matches!(e, LlmError::Authentication(_)) => {
                    error!("{}: authentication rejected, check the API key ({})", label, e);
                    return Err(e);
                }
                Err(e) if !e.is_transient() => {
                    error!("{}: non-retryable failure on attempt {}: {}", label, attempt, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("{}: attempt {}/{} failed: {}", label, attempt, attempts, e);
                    if attempt < attempts {
                        let delay = self.delay_after(attempt, &e);
                        info!("{}: retrying in {:?}", label, delay);
                        tokio::time::sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        error!("{}: all {} attempts failed", label, attempts);
        Err(last_error.unwrap_or_else(|| LlmError::Other("Max retries exceeded".to_string())))
    }
}
