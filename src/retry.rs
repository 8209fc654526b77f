//! Bounded polling helper
//!
//! Voice-list population, provider liveness, and speech-start
//! acknowledgment all wait on host signals that may never arrive on some
//! platforms. Every such wait in this crate goes through [`poll_until`],
//! so it is bounded by an attempt cap and gives up with `None` instead of
//! hanging.

use log::debug;
use std::thread;
use std::time::Duration;

/// Attempt cap and per-attempt delay for a bounded poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Policy that covers roughly `total` of wall time in `delay` steps
    pub fn spanning(total: Duration, delay: Duration) -> Self {
        let step = delay.as_millis().max(1);
        let attempts = (total.as_millis() / step).max(1) as u32;
        Self::new(attempts, delay)
    }
}

impl Default for RetryPolicy {
    /// Matches the voice-loading cap: 50 attempts at 100 ms, ~5s wall time
    fn default() -> Self {
        Self::new(50, Duration::from_millis(100))
    }
}

/// Poll `attempt` until it yields a value or the policy is exhausted
///
/// The closure receives the zero-based attempt number. No sleep happens
/// after the final attempt, so a single-attempt policy never blocks.
pub fn poll_until<T, F>(policy: &RetryPolicy, mut attempt: F) -> Option<T>
where
    F: FnMut(u32) -> Option<T>,
{
    for n in 0..policy.max_attempts {
        if let Some(value) = attempt(n) {
            if n > 0 {
                debug!("Poll succeeded on attempt {}", n + 1);
            }
            return Some(value);
        }
        if n + 1 < policy.max_attempts {
            thread::sleep(policy.delay);
        }
    }

    debug!("Poll gave up after {} attempts", policy.max_attempts);
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_success() {
        let policy = RetryPolicy::new(5, Duration::from_millis(50));
        let result = poll_until(&policy, |_| Some(42));
        assert_eq!(result, Some(42));
    }

    #[test]
    fn test_success_after_retries() {
        let policy = RetryPolicy::new(10, Duration::from_millis(1));
        let result = poll_until(&policy, |n| if n >= 3 { Some(n) } else { None });
        assert_eq!(result, Some(3));
    }

    #[test]
    fn test_exhaustion_returns_none() {
        let policy = RetryPolicy::new(4, Duration::from_millis(1));
        let mut calls = 0;
        let result: Option<()> = poll_until(&policy, |_| {
            calls += 1;
            None
        });
        assert_eq!(result, None);
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_spanning_policy() {
        let policy = RetryPolicy::spanning(Duration::from_millis(500), Duration::from_millis(100));
        assert_eq!(policy.max_attempts, 5);

        // Degenerate totals still allow one attempt
        let tiny = RetryPolicy::spanning(Duration::from_millis(1), Duration::from_millis(100));
        assert_eq!(tiny.max_attempts, 1);
    }
}
