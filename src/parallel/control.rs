// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Flags shared by all workers of one solve.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::debug;

use crate::timeout::Timeout;

#[derive(Debug, Default)]
pub struct SearchControl {
    timeout: Timeout,
    stop: AtomicBool,
    solution_claimed: AtomicBool,
    restart_generation: AtomicU64,
}

impl SearchControl {
    pub fn new(timeout: Timeout) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> &Timeout {
        &self.timeout
    }

    /// Ask every worker to finish at its next node.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    #[inline]
    pub fn stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Exactly one caller wins; the winner's mapping is the reported solution and
    /// everyone else is stopped.
    pub fn claim_solution(&self) -> bool {
        let won = self
            .solution_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.stop();
        }
        won
    }

    /// Leader announces a restart; followers restart when they notice.
    pub fn broadcast_restart(&self) -> u64 {
        let generation = self.restart_generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "restart broadcast");
        generation
    }

    #[inline]
    pub fn restart_generation(&self) -> u64 {
        self.restart_generation.load(Ordering::Acquire)
    }
}
