// Consumer-side retry policy for idempotent calls

use crate::error::{ApiError, ApiResult};
use std::time::Duration;
use tokio::time::sleep;

/// Delay schedule between attempts
#[derive(Debug, Clone, PartialEq)]
pub enum Backoff {
    /// Retry immediately
    Immediate,
    /// Exponential backoff
    Exponential { base_delay: Duration, max_delay: Duration, multiplier: f64 },
    /// Fixed delay
    Fixed(Duration),
}

/// Default backoff is exponential
impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

impl Backoff {
    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1
    pub fn delay(&self, attempt: usize) -> Duration {
        match self {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Fixed(duration) => *duration,
            Backoff::Exponential { base_delay, max_delay, multiplier } => {
                let delay_ms = base_delay.as_millis() as f64 * multiplier.powi(attempt as i32 - 1);
                Duration::from_millis(delay_ms as u64).min(*max_delay)
            }
        }
    }
}

/// Whether a failed call is worth repeating.
///
/// Only failures where no answer or a gateway error came back qualify; auth,
/// client errors, decode failures and cancellation are final.
pub fn is_retryable(error: &ApiError) -> bool {
    match error {
        ApiError::Transport { .. } | ApiError::Timeout { .. } => true,
        ApiError::Http { status, .. } => matches!(status, 502 | 503 | 504),
        _ => false,
    }
}

/// Retry wrapper used by consumers for status fetches.
///
/// The API client never retries on its own; actions must not go through here
/// because they are not idempotent.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Single attempt
    pub fn none() -> Self {
        Self::new(1, Backoff::Immediate)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Execute an operation, retrying retryable failures
    pub async fn run<F, T, Fut>(&self, operation_name: &str, operation: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ApiResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::info!("Operation '{}' succeeded on attempt {}", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    tracing::warn!("Operation '{}' failed on attempt {}: {}", operation_name, attempt, error);

                    if attempt >= self.max_attempts || !is_retryable(&error) {
                        return Err(error);
                    }

                    let delay = self.backoff.delay(attempt);
                    tracing::debug!("Retrying in {:?}...", delay);
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
