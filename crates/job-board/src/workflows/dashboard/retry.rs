use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::source::SourceError;

/// Timeout and fixed-delay retry settings shared by every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Upper bound for a single request.
    pub timeout: Duration,
    /// Attempts after the first one.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Error returned once every attempt of an operation has failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed after {attempts} attempt(s): {source}")]
pub struct RetryExhausted {
    pub operation: &'static str,
    pub attempts: u32,
    #[source]
    pub source: SourceError,
}

impl FetchPolicy {
    /// Runs one request, aborting it once the timeout elapses.
    pub async fn timed<T, Fut>(&self, resource: &'static str, request: Fut) -> Result<T, SourceError>
    where
        Fut: Future<Output = Result<T, SourceError>>,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout {
                resource,
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }

    /// Re-runs `op` after a fixed delay until it succeeds, hits a non-retryable
    /// error, or uses up `max_retries`.
    pub async fn retry<T, F, Fut>(&self, operation: &'static str, op: F) -> Result<T, RetryExhausted>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_retryable() && attempt <= self.max_retries => {
                    warn!(
                        operation,
                        attempt,
                        delay_ms = self.retry_delay.as_millis() as u64,
                        error = %err,
                        "fetch failed, retrying after delay"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => {
                    warn!(operation, attempt, error = %err, "giving up");
                    return Err(RetryExhausted {
                        operation,
                        attempts: attempt,
                        source: err,
                    });
                }
            }
        }
    }
}
