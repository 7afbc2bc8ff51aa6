/*!
 * Retry policy for provider requests.
 *
 * A policy decides, per failed attempt, whether to wait and try again. Rate
 * limiting waits a fixed delay; transient transport failures back off
 * exponentially from `backoff_base`. Every wait, and every attempt, is raced
 * against the run's cancellation token.
 */

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::ProviderError;
use crate::logging::LogSink;

/// How often, and how patiently, a request is retried
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Wait after a rate-limited attempt
    pub rate_limit_delay: Duration,
    /// Base wait after a transient failure, doubled on each retry
    pub backoff_base: Duration,
    /// Whether connection errors, timeouts and 5xx responses are retried
    pub retry_transient: bool,
    /// Whether running out of attempts while rate limited aborts the whole run
    pub fatal_rate_limit: bool,
}

impl RetryPolicy {
    /// One attempt, every failure reported as-is
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            rate_limit_delay: Duration::ZERO,
            backoff_base: Duration::ZERO,
            retry_transient: false,
            fatal_rate_limit: false,
        }
    }

    /// Policy for a throttled API: bounded attempts, fixed rate-limit delay, fatal exhaustion
    pub fn rate_limited(max_attempts: u32, rate_limit_delay: Duration, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            rate_limit_delay,
            backoff_base,
            retry_transient: true,
            fatal_rate_limit: true,
        }
    }

    /// Backoff before the retry that follows `attempt` (1-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// Successful responses are trimmed, and a reply that is blank after
    /// trimming is a `ParseError` that is not retried. A run that is still rate limited on
    /// its last attempt ends in `RateLimitExceeded` when `fatal_rate_limit`
    /// is set, otherwise in the last `RateLimited` error.
    pub async fn run<F, Fut>(
        &self,
        cancel: &CancellationToken,
        log: &dyn LogSink,
        mut operation: F,
    ) -> Result<String, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                result = operation() => result,
            };

            let error = match result {
                Ok(text) if text.trim().is_empty() => {
                    return Err(ProviderError::ParseError("Response contains no text".to_string()))
                }
                Ok(text) => return Ok(text.trim().to_string()),
                Err(error) => error,
            };
            let last_attempt = attempt >= max_attempts;

            let wait = match error {
                ProviderError::RateLimited(_) if last_attempt => {
                    if self.fatal_rate_limit {
                        return Err(ProviderError::RateLimitExceeded { attempts: attempt });
                    }
                    return Err(error);
                }
                ProviderError::RateLimited(_) => {
                    log.warn(&format!(
                        "Rate limit reached. Waiting for {} seconds before retrying (attempt {}/{})",
                        self.rate_limit_delay.as_secs(),
                        attempt,
                        max_attempts
                    ));
                    self.rate_limit_delay
                }
                ref transient if transient.is_transient() && self.retry_transient && !last_attempt => {
                    let backoff = self.backoff_for(attempt);
                    log.warn(&format!(
                        "{} - retrying in {}ms (attempt {}/{})",
                        transient,
                        backoff.as_millis(),
                        attempt,
                        max_attempts
                    ));
                    backoff
                }
                _ => return Err(error),
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}
