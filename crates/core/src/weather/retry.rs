//! Bounded retry with exponential backoff for the weather fetch
//!
//! Remote weather APIs fail transiently often enough that one retry policy
//! wraps every fetch. Only errors flagged transient are retried; a malformed
//! payload fails immediately.

use crate::error::{Result, RiskError};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_backoff: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent.
    ///
    /// Exhaustion yields a non-transient [`RiskError::WeatherFetch`] carrying
    /// the attempt count and the last failure.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_retries => {
                    let backoff = self.backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_retries + 1,
                        backoff_ms = backoff.as_millis(),
                        error = %err,
                        "transient weather fetch failure, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    return Err(RiskError::WeatherFetch {
                        message: format!("gave up after {} attempts: {err}", attempt + 1),
                        transient: false,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}
