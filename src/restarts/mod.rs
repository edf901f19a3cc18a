// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Restart schedules.
//!
//! A schedule only answers "how much may the next run spend?" via
//! [`RestartsSchedule::next_budget`]. The per-worker [`RestartTracker`] counts
//! backtracks and wall-clock time against the current [`Budget`] and moves to the
//! next one when the engine restarts.

use std::fmt;
use std::time::{Duration, Instant};

/// How much search a run may do before it should restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Backtracks(u64),
    /// Elapsed time since the last restart, but only once enough backtracks happened.
    Interval {
        interval: Duration,
        minimum_backtracks: u64,
    },
    Unbounded,
}

impl Budget {
    pub fn exhausted(&self, backtracks: u64, elapsed: Duration) -> bool {
        match *self {
            Budget::Backtracks(limit) => backtracks >= limit,
            Budget::Interval {
                interval,
                minimum_backtracks,
            } => backtracks >= minimum_backtracks && elapsed >= interval,
            Budget::Unbounded => false,
        }
    }
}

/// Policy producing the sequence of budgets.
pub trait RestartsSchedule: fmt::Debug + Send {
    /// Budget for the run that follows restart number `restart_index` (0 = first run).
    fn next_budget(&self, restart_index: u64) -> Budget;

    /// False when the schedule never restarts, letting the engine skip bookkeeping.
    fn might_restart(&self) -> bool {
        true
    }
}

/// Term `i` (0-based) of the Luby sequence 1,1,2,1,1,2,4,1,...
pub fn luby(i: u64) -> u64 {
    let mut n = i + 1;
    loop {
        let k = 64 - n.leading_zeros();
        if n == (1u64 << k) - 1 {
            return 1u64 << (k - 1);
        }
        n -= (1u64 << (k - 1)) - 1;
    }
}

#[derive(Debug, Clone)]
pub struct Luby {
    multiplier: u64,
}

impl Luby {
    pub fn new(multiplier: u64) -> Self {
        Self { multiplier }
    }
}

impl RestartsSchedule for Luby {
    fn next_budget(&self, restart_index: u64) -> Budget {
        Budget::Backtracks(self.multiplier.saturating_mul(luby(restart_index)))
    }
}

#[derive(Debug, Clone)]
pub struct Geometric {
    initial_value: f64,
    multiplier: f64,
}

impl Geometric {
    pub fn new(initial_value: f64, multiplier: f64) -> Self {
        Self {
            initial_value,
            multiplier,
        }
    }
}

impl RestartsSchedule for Geometric {
    fn next_budget(&self, restart_index: u64) -> Budget {
        let exponent = i32::try_from(restart_index).unwrap_or(i32::MAX);
        let value = self.initial_value * self.multiplier.powi(exponent);
        // float to int casts saturate
        Budget::Backtracks(value.ceil() as u64)
    }
}

#[derive(Debug, Clone)]
pub struct Timed {
    interval: Duration,
    minimum_backtracks: u64,
}

impl Timed {
    pub fn new(interval: Duration, minimum_backtracks: u64) -> Self {
        Self {
            interval,
            minimum_backtracks,
        }
    }
}

impl RestartsSchedule for Timed {
    fn next_budget(&self, _restart_index: u64) -> Budget {
        Budget::Interval {
            interval: self.interval,
            minimum_backtracks: self.minimum_backtracks,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NoRestarts;

impl RestartsSchedule for NoRestarts {
    fn next_budget(&self, _restart_index: u64) -> Budget {
        Budget::Unbounded
    }

    fn might_restart(&self) -> bool {
        false
    }
}

/// A schedule plus the counters of the current run.
#[derive(Debug)]
pub struct RestartTracker {
    schedule: Box<dyn RestartsSchedule>,
    restarts: u64,
    budget: Budget,
    backtracks: u64,
    started: Instant,
}

impl RestartTracker {
    pub fn new(schedule: Box<dyn RestartsSchedule>) -> Self {
        let budget = schedule.next_budget(0);
        Self {
            schedule,
            restarts: 0,
            budget,
            backtracks: 0,
            started: Instant::now(),
        }
    }

    pub fn might_restart(&self) -> bool {
        self.schedule.might_restart()
    }

    pub fn did_backtrack(&mut self) {
        self.backtracks += 1;
    }

    /// True once the budget is spent. Never true before the first backtrack
    /// since the last restart, so every run learns at least one nogood.
    pub fn should_restart(&self) -> bool {
        if self.backtracks == 0 {
            return false;
        }
        match self.budget {
            Budget::Unbounded => false,
            Budget::Backtracks(_) => self.budget.exhausted(self.backtracks, Duration::ZERO),
            Budget::Interval { .. } => self.budget.exhausted(self.backtracks, self.started.elapsed()),
        }
    }

    pub fn did_restart(&mut self) {
        self.restarts += 1;
        self.budget = self.schedule.next_budget(self.restarts);
        self.backtracks = 0;
        self.started = Instant::now();
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }
}
