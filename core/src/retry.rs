//! Bounded, sequential retry around a fallible blocking operation.
//!
//! Every failure is retried the same way: a 404 gets the same treatment as a
//! refused connection. The first attempt is not a retry, so an operation runs
//! at most `1 + max_retries` times.

use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::ApiError;

/// Default number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay inserted before each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Retry immediately.
    #[default]
    None,
    /// Wait the same amount before every retry.
    Fixed(Duration),
    /// Double the delay on each retry, starting at `initial` and capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Delay before retry number `retry` (1-based).
    pub fn delay(&self, retry: u32) -> Duration {
        match *self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { initial, max } => {
                let factor = 2u32.saturating_pow(retry.saturating_sub(1));
                initial.saturating_mul(factor).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: Backoff::None,
        }
    }
}

impl RetryPolicy {
    /// Initial attempt plus every retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Runs `attempt` until it succeeds or the retries run out, returning the
    /// last error in the latter case.
    pub fn run<T, F>(&self, operation: &str, mut attempt: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Result<T, ApiError>,
    {
        debug!("{operation}: attempt 1/{}", self.max_attempts());
        let mut last_error = match attempt() {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        warn!("{operation}: attempt failed: {last_error}");

        for retry in 1..=self.max_retries {
            let delay = self.backoff.delay(retry);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
            info!("{operation}: Retrying ({retry}/{})", self.max_retries);
            match attempt() {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("{operation}: retry {retry}/{} failed: {e}", self.max_retries);
                    last_error = e;
                }
            }
        }

        error!(
            "{operation}: giving up after {} attempts: {last_error}",
            self.max_attempts()
        );
        Err(last_error)
    }
}
