//! Exponential backoff schedule.

use std::time::Duration;

/// Delay to apply before the attempt that follows `attempt_index` completed
/// failures: `initial_backoff * 2^attempt_index`.
///
/// Deliberately deterministic (no jitter) so retry timing is testable.
/// Total over all inputs; the shift saturates rather than overflowing.
/// Callers must not ask for a delay after exhausting their retry budget.
pub fn delay_for(attempt_index: u32, initial_backoff: Duration) -> Duration {
    let factor = 1u32.checked_shl(attempt_index).unwrap_or(u32::MAX);
    initial_backoff.saturating_mul(factor)
}
