//! Retry policy parameters.

use std::time::Duration;

/// Bounds for one logical fetch: how many retries, how long the initial
/// backoff is, and how long any single attempt may run.
///
/// Constructed once per logical operation and not mutated during execution.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `max_retries = 4` means up to 5
    /// attempts total.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each retry after that.
    pub initial_backoff: Duration,
    /// Budget for a single attempt. When it elapses the in-flight call is
    /// aborted and counted as a transient failure.
    pub per_attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_backoff: Duration::from_millis(800),
            per_attempt_timeout: Duration::from_secs(12),
        }
    }
}

impl RetryPolicy {
    /// Policy used by the named API operations (`wake`, `list_animals`).
    pub fn api() -> Self {
        Self {
            max_retries: 4,
            initial_backoff: Duration::from_millis(700),
            ..Self::default()
        }
    }

    /// Total attempts this policy allows, counting the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}
