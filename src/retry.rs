//! Bounded retry loop for transient HTTP failures
//!
//! The loop carries an explicit attempt counter instead of recursing, and it
//! sleeps through `tokio::time`, so tests can drive the backoff with a paused
//! clock.
//!
//! # Example
//!
//! ```no_run
//! use subdivx_dl::retry::{IsRetryable, fetch_with_retry};
//! use subdivx_dl::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Busy,
//!     Gone,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Busy)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let config = RetryConfig::default();
//! let body = fetch_with_retry(&config, || async {
//!     Ok::<_, MyError>("<html></html>".to_string())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::TransportError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

/// Only 5xx answers are retried; connection failures and 4xx surface at once.
impl IsRetryable for TransportError {
    fn is_retryable(&self) -> bool {
        matches!(self, TransportError::ServerError { .. })
    }
}

/// Execute an async operation, retrying retryable failures
///
/// The operation runs once, then up to `config.max_attempts` more times while
/// it keeps failing with a retryable error. The pause before each retry comes
/// from [`backoff_delay`].
///
/// # Returns
///
/// Returns the successful result, the first non-retryable error, or the last
/// retryable error once the retries are used up.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut retries = 0;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(retries, "request recovered after server errors");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !error.is_retryable() {
            tracing::debug!(error = %error, "request failed, not retrying");
            return Err(error);
        }

        if retries >= config.max_attempts {
            tracing::warn!(
                error = %error,
                requests = retries + 1,
                "server kept failing, giving up"
            );
            return Err(error);
        }

        retries += 1;
        let delay = backoff_delay(config, retries);
        let delay = if config.jitter {
            add_jitter(delay)
        } else {
            delay
        };

        tracing::warn!(
            error = %error,
            retry = retries,
            max_retries = config.max_attempts,
            delay_ms = delay.as_millis(),
            "server error, retrying"
        );

        tokio::time::sleep(delay).await;
    }
}

/// Pause before retry number `retry` (counted from 1)
///
/// `initial_delay * backoff_multiplier^(retry - 1)`, capped at `max_delay`.
/// A schedule that leaves the range of [`Duration`] (negative, NaN or
/// overflowing) falls back to `max_delay`.
pub fn backoff_delay(config: &RetryConfig, retry: u32) -> Duration {
    let exponent = i32::try_from(retry.saturating_sub(1)).unwrap_or(i32::MAX);
    let secs = config.initial_delay.as_secs_f64() * config.backoff_multiplier.powi(exponent);

    Duration::try_from_secs_f64(secs)
        .unwrap_or(config.max_delay)
        .min(config.max_delay)
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor)).unwrap_or(delay)
}
