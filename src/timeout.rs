// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Process-wide deadline shared by every worker.
//!
//! The aborted flag only ever goes from unset to set. Workers call
//! [`Timeout::check`] on entering each search node; the first caller to see the
//! deadline pass sets the flag and every later check returns immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::info;

#[derive(Debug)]
pub struct Timeout {
    deadline: Option<Instant>,
    aborted: AtomicBool,
}

impl Timeout {
    /// Deadline `duration` from now; zero means no deadline.
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: (!duration.is_zero()).then(|| Instant::now() + duration),
            aborted: AtomicBool::new(false),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(Duration::ZERO)
    }

    /// A timeout that has already fired: the search stops at its first node.
    pub fn expired() -> Self {
        Self {
            deadline: Some(Instant::now()),
            aborted: AtomicBool::new(false),
        }
    }

    /// True once the deadline has passed or [`abort`](Self::abort) was called.
    #[inline]
    pub fn check(&self) -> bool {
        if self.aborted.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.abort();
                true
            }
            _ => false,
        }
    }

    /// Set the aborted flag. Returns true for the one call that actually set it.
    pub fn abort(&self) -> bool {
        let first = self
            .aborted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok();
        if first {
            info!("search aborted by timeout");
        }
        first
    }

    pub fn aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_unbounded() {
        let t = Timeout::new(Duration::ZERO);
        assert!(!t.check());
        assert!(!t.aborted());
    }

    #[test]
    fn test_expired_fires_on_first_check() {
        let t = Timeout::expired();
        assert!(!t.aborted());
        assert!(t.check());
        assert!(t.aborted());
    }

    #[test]
    fn test_abort_is_set_once() {
        let t = Timeout::unbounded();
        assert!(t.abort());
        assert!(!t.abort());
        assert!(t.check());
    }

    #[test]
    fn test_short_deadline_passes() {
        let t = Timeout::new(Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert!(t.check());
    }
}
