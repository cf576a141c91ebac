use std::time::Duration;

/// HTTP statuses retried below the circuit breaker.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Retry schedule for a single upstream call.
///
/// Retries happen inside one data-source call, so a call that exhausts its
/// retries is still a single circuit breaker failure.
///
/// # Behavior Summary
///
/// | Outcome | Retried? | Final classification |
/// |---------|----------|----------------------|
/// | 429 | Yes | `RateLimited` |
/// | 500/502/503/504 | Yes | `Transport` |
/// | timeout / connect error | Yes | `Transport` |
/// | other non-success status | No | `Transport` / `ProviderError` |
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// A policy that never waits between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_base: Duration::ZERO,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::immediate(0)
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.backoff_base.saturating_mul(1u32 << retry.min(16))
    }

    /// Whether an HTTP status is worth another attempt.
    pub fn is_retryable_status(status: u16) -> bool {
        RETRYABLE_STATUSES.contains(&status)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}
