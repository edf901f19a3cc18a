// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Statistics
//!
//! Each worker keeps its own [`Statistics`]; the coordinator merges them after
//! every worker has finished. Propagation failures are counted per kind in the
//! same array, after the plain counters.

use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{EnumCount as EnumCountMacro, EnumIter, IntoStaticStr};

use crate::propagation::{FailureKind, PropagationFailure};

#[derive(EnumCountMacro, EnumIter, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Counters {
    Nodes,
    Propagations,
    Backtracks,
    Restarts,
    Solutions,
    Nogoods,
    OracleRejections,
    ValidationFailures,
}

const COUNT: usize = Counters::COUNT + PropagationFailure::COUNT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statistics {
    stats: [u64; COUNT],
}

impl Default for Statistics {
    fn default() -> Self {
        Self { stats: [0; COUNT] }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Statistics::default()
    }

    /// Increment the specified counter by 1.
    #[inline]
    pub fn increment(&mut self, counter: Counters) {
        self.stats[counter as usize] += 1;
    }

    pub fn add(&mut self, counter: Counters, amount: u64) {
        self.stats[counter as usize] += amount;
    }

    /// Get the current value of the specified counter.
    pub fn get(&self, counter: Counters) -> u64 {
        self.stats[counter as usize]
    }

    pub fn record_failure(&mut self, failure: &PropagationFailure) {
        self.stats[Counters::COUNT + failure.kind() as usize] += 1;
    }

    pub fn failures(&self, kind: FailureKind) -> u64 {
        self.stats[Counters::COUNT + kind as usize]
    }

    /// Add every counter of `other` into `self`.
    pub fn merge(&mut self, other: &Statistics) {
        for (mine, theirs) in self.stats.iter_mut().zip(other.stats.iter()) {
            *mine += theirs;
        }
    }

    /// Non-zero failure counts, by kind name.
    pub fn failure_counts(&self) -> impl Iterator<Item = (&'static str, u64)> + '_ {
        FailureKind::iter()
            .map(|kind| (kind.name(), self.failures(kind)))
            .filter(|&(_, n)| n > 0)
    }
}
