//! Deadline tracking for connect and handshake waits
//!
//! A zero budget means "no deadline": waits block until the operation
//! completes. Any other budget is measured from the moment the deadline is
//! armed, so repeated waits only ever see what is left of it.

use std::time::{Duration, Instant};

/// Remaining-time tracker for a single bounded operation.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    /// Arm a deadline now. `Duration::ZERO` disables it.
    #[must_use]
    pub fn start(timeout: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget: budget_from(timeout),
        }
    }

    /// A deadline that never expires.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            started: Instant::now(),
            budget: None,
        }
    }

    /// The full budget this deadline was armed with, `None` when unbounded.
    #[must_use]
    pub fn budget(&self) -> Option<Duration> {
        self.budget
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.budget.is_none()
    }

    /// Time left before expiry. `None` when unbounded, `Some(ZERO)` once
    /// expired.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.budget
            .map(|budget| budget.saturating_sub(self.started.elapsed()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Remaining time as a `poll(2)` timeout: `-1` when unbounded, otherwise
    /// milliseconds rounded up so a wait never returns before the deadline.
    #[must_use]
    pub fn poll_timeout_ms(&self) -> libc::c_int {
        match self.remaining() {
            None => -1,
            Some(left) => {
                let millis = left.as_nanos().div_ceil(1_000_000);
                libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX)
            }
        }
    }
}

/// Map a caller-supplied timeout onto an optional budget; zero means none.
#[must_use]
pub fn budget_from(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() {
        None
    } else {
        Some(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_is_unbounded_not_expired() {
        let deadline = Deadline::start(Duration::ZERO);
        assert!(deadline.is_unbounded());
        assert!(!deadline.is_expired());
        assert_eq!(deadline.remaining(), None);
        assert_eq!(deadline.poll_timeout_ms(), -1);
    }

    #[test]
    fn remaining_shrinks_with_elapsed_time() {
        let deadline = Deadline::start(Duration::from_millis(200));
        std::thread::sleep(Duration::from_millis(50));
        let left = deadline.remaining().unwrap();
        assert!(left <= Duration::from_millis(150));
        assert!(left > Duration::ZERO);
        assert!(deadline.poll_timeout_ms() <= 150);
    }

    #[test]
    fn expired_deadline_reports_zero() {
        let deadline = Deadline::start(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
        assert_eq!(deadline.poll_timeout_ms(), 0);
    }

    #[test]
    fn budget_converts_to_poll_millis() {
        let deadline = Deadline::start(Duration::from_secs(3600));
        assert!(deadline.poll_timeout_ms() > 3_599_000);
        assert_eq!(budget_from(Duration::from_micros(10)), Some(Duration::from_micros(10)));
    }
}
