// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! VertexSet type for representing sets of target vertices as bitsets.
//!
//! Bit i (across all words) is set when vertex i is in the set. The universe size
//! is fixed at construction, so sets over the same bigraph combine word by word.
//!
//! # Examples
//!
//! ```
//! use bigraph_match::domain::VertexSet;
//!
//! let mut set = VertexSet::empty(100);
//! set.insert(3);
//! set.insert(70);
//!
//! assert_eq!(set.len(), 2);
//! assert!(set.contains(70));
//! assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 70]);
//! ```

use std::fmt;

/// Number of u64 words needed for `n` bits.
#[inline]
pub fn words_for(n: usize) -> usize {
    n.div_ceil(64)
}

/// A set of vertices of one bigraph, as a bitset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexSet {
    words: Vec<u64>,
    universe: usize,
}

impl VertexSet {
    pub fn empty(universe: usize) -> Self {
        Self {
            words: vec![0; words_for(universe)],
            universe,
        }
    }

    /// Every vertex `0..universe`.
    pub fn full(universe: usize) -> Self {
        let mut set = Self::empty(universe);
        let complete = universe / 64;
        for w in &mut set.words[..complete] {
            *w = u64::MAX;
        }
        let remaining = universe % 64;
        if remaining > 0 {
            set.words[complete] = (1u64 << remaining) - 1;
        }
        set
    }

    pub fn universe(&self) -> usize {
        self.universe
    }

    #[inline]
    pub fn contains(&self, v: usize) -> bool {
        v < self.universe && (self.words[v / 64] >> (v % 64)) & 1 != 0
    }

    /// # Panics
    ///
    /// Panics if `v` is outside the universe.
    #[inline]
    pub fn insert(&mut self, v: usize) {
        assert!(v < self.universe, "vertex out of range: {} >= {}", v, self.universe);
        self.words[v / 64] |= 1u64 << (v % 64);
    }

    #[inline]
    pub fn remove(&mut self, v: usize) {
        if v < self.universe {
            self.words[v / 64] &= !(1u64 << (v % 64));
        }
    }

    pub fn len(&self) -> usize {
        popcount(&self.words)
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Vertices in ascending order.
    pub fn iter(&self) -> BitsIter<'_> {
        BitsIter::new(&self.words)
    }

    pub fn first(&self) -> Option<usize> {
        self.iter().next()
    }

    pub fn intersect_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= *b;
        }
    }

    pub fn union_with(&mut self, other: &Self) {
        self.union_with_words(&other.words);
    }

    /// Union with raw words over the same universe, e.g. a domain.
    pub fn union_with_words(&mut self, words: &[u64]) {
        for (a, b) in self.words.iter_mut().zip(words) {
            *a |= *b;
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    pub fn difference_with(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !*b;
        }
    }

    /// Size of `self ∩ other` without allocating.
    pub fn intersection_len(&self, other: &Self) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }
}

#[inline]
pub(crate) fn popcount(words: &[u64]) -> usize {
    words.iter().map(|w| w.count_ones() as usize).sum()
}

/// Ascending iterator over the set bits of a word slice.
pub struct BitsIter<'a> {
    words: &'a [u64],
    word_idx: usize,
    current: u64,
}

impl<'a> BitsIter<'a> {
    pub(crate) fn new(words: &'a [u64]) -> Self {
        Self {
            words,
            word_idx: 0,
            current: words.first().copied().unwrap_or(0),
        }
    }
}

impl Iterator for BitsIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.current == 0 {
            self.word_idx += 1;
            if self.word_idx >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_idx];
        }
        let bit = self.current.trailing_zeros() as usize;
        self.current &= self.current - 1;
        Some(self.word_idx * 64 + bit)
    }
}

impl fmt::Display for VertexSet {
    /// Format as "{0, 5, 12}".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, "}}")
    }
}
