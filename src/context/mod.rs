// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Search context combining MEMO and DYNAMIC state.
//!
//! The SearchContext is the core data structure that combines:
//! - Tier 1 (MEMO): immutable [`MemoizedData`], shared by reference
//! - Tier 2 (DYNAMIC): the trailed [`DomainStore`], the worker's nogoods and counters
//!
//! Parallel workers each own a SearchContext over the same MEMO data.

use crate::domain::DomainStore;
use crate::memo::MemoizedData;
use crate::propagation::nogoods::NogoodStore;
use crate::propagation::{self, PropagationFailure};
use crate::state::Statistics;

#[derive(Debug)]
pub struct SearchContext<'a> {
    /// Immutable precomputed data (Tier 1)
    pub memo: &'a MemoizedData,
    /// Candidate sets and their trail (Tier 2)
    pub store: DomainStore,
    /// Learnt at restarts; never undone
    pub nogoods: NogoodStore,
    pub statistics: Statistics,
}

impl<'a> SearchContext<'a> {
    /// Root context: domains after root filtering, not yet propagated.
    pub fn new(memo: &'a MemoizedData) -> Result<Self, PropagationFailure> {
        let store = propagation::initial::filter_domains(memo)?;
        Ok(Self::with_store(memo, store))
    }

    /// Context over an existing store, e.g. a frozen copy of the propagated root.
    pub fn with_store(memo: &'a MemoizedData, store: DomainStore) -> Self {
        Self {
            memo,
            store,
            nogoods: NogoodStore::new(),
            statistics: Statistics::new(),
        }
    }

    /// Image of each pattern vertex, if assigned.
    pub fn assignment(&self) -> Vec<Option<usize>> {
        (0..self.store.len()).map(|v| self.store.assigned(v)).collect()
    }

    /// A fresh worker context sharing MEMO data, starting from this context's
    /// current domains.
    pub fn fork(&self) -> SearchContext<'a> {
        Self::with_store(self.memo, self.store.clone())
    }
}
