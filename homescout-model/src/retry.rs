//! Backoff policy for calls to remote model and embedding services.

use homescout_core::{Result, ScoutError};
use std::{future::Future, time::Duration};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    #[must_use]
    pub fn with_backoff_multiplier(mut self, backoff_multiplier: f32) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    /// Sleep durations between attempts, one per allowed retry.
    pub fn delays(&self) -> Backoff {
        Backoff {
            next: self.initial_delay.min(self.max_delay),
            max: self.max_delay,
            multiplier: f64::from(self.backoff_multiplier.max(1.0)),
            remaining: if self.enabled { self.max_retries } else { 0 },
        }
    }
}

/// Exponential delay sequence capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
    multiplier: f64,
    remaining: u32,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next;
        self.next = Duration::from_secs_f64(current.as_secs_f64() * self.multiplier).min(self.max);
        Some(current)
    }
}

#[must_use]
pub fn is_retryable_status_code(status_code: u16) -> bool {
    matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
}

/// A failed attempt, classified where the cause is still known.
#[derive(Debug)]
pub struct AttemptError {
    pub error: ScoutError,
    pub retryable: bool,
}

impl AttemptError {
    pub fn retryable(error: ScoutError) -> Self {
        Self { error, retryable: true }
    }

    pub fn fatal(error: ScoutError) -> Self {
        Self { error, retryable: false }
    }

    /// A non-success HTTP response. Only the status code decides; the body
    /// is never inspected.
    pub fn from_status(status_code: u16, error: ScoutError) -> Self {
        Self { error, retryable: is_retryable_status_code(status_code) }
    }
}

impl From<ScoutError> for AttemptError {
    fn from(error: ScoutError) -> Self {
        Self::fatal(error)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable
/// [`AttemptError`], or the retry budget is spent.
pub async fn execute_attempts<T, Op, Fut>(retry_config: &RetryConfig, mut operation: Op) -> Result<T>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, AttemptError>>,
{
    let mut delays = retry_config.delays();
    let mut attempt: u32 = 0;

    loop {
        let failure = match operation().await {
            Ok(value) => return Ok(value),
            Err(failure) => failure,
        };
        if !failure.retryable {
            return Err(failure.error);
        }
        let Some(delay) = delays.next() else {
            return Err(failure.error);
        };
        attempt += 1;
        homescout_telemetry::warn!(
            attempt = attempt,
            max_retries = retry_config.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %failure.error,
            "remote call failed with retryable error; retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
