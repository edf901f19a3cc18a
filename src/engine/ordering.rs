// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Variable and value ordering heuristics.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::ValueOrdering;
use crate::domain::DomainStore;
use crate::memo::MemoizedData;

/// SplitMix64 mixer for deriving per-worker seeds from a base seed.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Fail-first: the unassigned search variable with the fewest candidates, ties
/// broken by higher pattern degree, then lower index.
pub fn choose_variable(memo: &MemoizedData, store: &DomainStore) -> Option<usize> {
    memo.search_vars
        .iter()
        .copied()
        .filter(|&v| !store.is_assigned(v))
        .min_by_key(|&v| (store.size(v), std::cmp::Reverse(memo.pattern_degree(v)), v))
}

/// Orders candidate values; owns the worker's random state and success scores.
#[derive(Debug)]
pub struct ValueOrderer {
    ordering: ValueOrdering,
    rng: SmallRng,
    /// How often each target vertex was on the branch in force at a restart.
    scores: Vec<u64>,
}

impl ValueOrderer {
    pub fn new(ordering: ValueOrdering, seed: u64, n_values: usize) -> Self {
        Self {
            ordering,
            rng: SmallRng::seed_from_u64(seed),
            scores: vec![0; n_values],
        }
    }

    pub fn ordering(&self) -> ValueOrdering {
        self.ordering
    }

    /// Reorder `values` (given ascending) in place.
    pub fn order(&mut self, memo: &MemoizedData, values: &mut [usize]) {
        match self.ordering {
            ValueOrdering::Degree => values.sort_by_key(|&t| memo.target_degree(t)),
            ValueOrdering::AntiDegree => values.sort_by_key(|&t| std::cmp::Reverse(memo.target_degree(t))),
            ValueOrdering::Random => values.shuffle(&mut self.rng),
            ValueOrdering::Biased => self.biased(memo, values),
        }
    }

    /// Weighted shuffle: weight `2^(degree - max degree) * (1 + score)`.
    fn biased(&mut self, memo: &MemoizedData, values: &mut [usize]) {
        let max_degree = values.iter().map(|&t| memo.target_degree(t)).max().unwrap_or(0);
        let mut keyed: Vec<(f64, usize)> = values
            .iter()
            .map(|&t| {
                let exponent = (memo.target_degree(t) as f64 - max_degree as f64).max(-60.0);
                let weight = exponent.exp2() * (1.0 + self.scores[t] as f64);
                // Efraimidis-Spirakis key: larger keys come first
                let key = self.rng.gen::<f64>().powf(1.0 / weight);
                (key, t)
            })
            .collect();
        keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        for (slot, (_, t)) in values.iter_mut().zip(keyed) {
            *slot = t;
        }
    }

    /// Feedback from a restart: `value` was part of the abandoned branch.
    pub fn reward(&mut self, value: usize) {
        self.scores[value] += 1;
    }
}
