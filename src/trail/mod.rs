// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Trail-based backtracking for the domain store.
//!
//! Every mutation of trailed search state records the slot it touched and the
//! value it held before. Undoing to a mark replays those entries newest first,
//! so rolling back k changes costs O(k) regardless of how large the domains are.
//!
//! The trail itself does not know where slots live; the owner supplies a restore
//! callback to [`Trail::undo_to`]. Each search worker owns exactly one trail.

/// Identifies one trailed word of search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// One 64-bit word of a pattern vertex's candidate bitset.
    DomainWord { var: u32, word: u32 },
    /// Cached population count of a pattern vertex's candidate set.
    DomainSize { var: u32 },
    /// Target vertex assigned to a pattern vertex (`u64::MAX` when unassigned).
    Assignment { var: u32 },
}

/// A single entry in the trail, recording one state change.
#[derive(Debug, Clone, Copy)]
struct TrailEntry {
    slot: Slot,
    /// The value before the change
    old_value: u64,
}

/// The trail system for O(k) backtracking.
///
/// Marks are plain trail lengths. A frozen trail refuses to undo past the
/// freeze point, which protects root-level propagation across restarts.
#[derive(Debug)]
pub struct Trail {
    entries: Vec<TrailEntry>,
    frozen: usize,
}

impl Trail {
    const INITIAL_CAPACITY: usize = 16384;

    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(Self::INITIAL_CAPACITY),
            frozen: 0,
        }
    }

    /// Current position, usable as an undo target.
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    /// Record that `slot` held `old_value` before being overwritten.
    #[inline]
    pub fn record_change(&mut self, slot: Slot, old_value: u64) {
        self.entries.push(TrailEntry { slot, old_value });
    }

    /// Undo every change after `mark`, newest first, handing each slot and its
    /// previous value to `restore`. Never undoes past the freeze point.
    ///
    /// Returns the number of entries undone.
    pub fn undo_to(&mut self, mark: usize, mut restore: impl FnMut(Slot, u64)) -> usize {
        let target = mark.max(self.frozen);
        let mut undone = 0;
        while self.entries.len() > target {
            if let Some(entry) = self.entries.pop() {
                restore(entry.slot, entry.old_value);
                undone += 1;
            }
        }
        undone
    }

    /// Make the current position the floor for every later undo.
    pub fn freeze(&mut self) {
        self.frozen = self.entries.len();
    }

    pub fn frozen_at(&self) -> usize {
        self.frozen
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::new()
    }
}
