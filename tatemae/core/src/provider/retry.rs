//! Bounded retry for remote calls
//!
//! Only transient failures ([`ProviderError::is_transient`]) are retried.
//! Everything else is returned to the caller on the first occurrence.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::traits::ProviderError;

/// Retry configuration for remote provider calls
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Initial backoff delay
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay
    pub max_backoff_ms: u64,

    /// Backoff multiplier
    pub backoff_multiplier: f32,

    /// Add jitter to backoff
    pub use_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
            use_jitter: false,
        }
    }
}

impl RetryConfig {
    /// A policy that never retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Calculate backoff duration before retry N (0-indexed)
    #[must_use]
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_backoff_ms as f64 * f64::from(self.backoff_multiplier).powi(exponent);
        let capped = base.min(self.max_backoff_ms as f64);

        let duration_ms = if self.use_jitter {
            // Add up to 25% jitter
            let jitter = rand::random::<f64>() * 0.25;
            (capped * (1.0 + jitter)) as u64
        } else {
            capped as u64
        };

        Duration::from_millis(duration_ms)
    }

    /// Delay before the retry that follows `error` on attempt N (0-indexed)
    ///
    /// A server `Retry-After` hint can lengthen the wait but never shortens it
    /// below the computed backoff. The result never exceeds `max_backoff_ms`.
    #[must_use]
    pub fn delay_after(&self, error: &ProviderError, attempt: u32) -> Duration {
        let computed = self.backoff_for_attempt(attempt);
        match error {
            ProviderError::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms)
                .max(computed)
                .min(Duration::from_millis(self.max_backoff_ms)),
            _ => computed,
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error, or the last transient error once
    /// `max_attempts` calls have failed.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation = label, attempt = attempt + 1, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    let backoff = self.delay_after(&e, attempt);
                    warn!(
                        operation = label,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient provider failure, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
