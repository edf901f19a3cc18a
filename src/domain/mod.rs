// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Domain store: candidate target vertices for every pattern vertex.
//!
//! Domains are bitsets packed into one flat word array. Every word that changes,
//! every cached size and every assignment is recorded on the store's own
//! [`Trail`], so [`DomainStore::undo_to`] restores the exact state at a mark.
//!
//! Domains only shrink between a mark and the matching undo; an emptied domain is
//! reported immediately as [`Restriction::Emptied`] and the caller must fail.

pub mod vertex_set;

pub use vertex_set::{BitsIter, VertexSet};

use crate::bigraph::Bigraph;
use crate::trail::{Slot, Trail};
use vertex_set::{popcount, words_for};

const UNASSIGNED: u64 = u64::MAX;

/// Outcome of shrinking one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    Unchanged,
    Reduced,
    Emptied,
}

impl Restriction {
    pub fn is_emptied(self) -> bool {
        self == Restriction::Emptied
    }
}

/// Per-pattern-vertex candidate sets plus their undo trail.
#[derive(Debug)]
pub struct DomainStore {
    n_values: usize,
    words_per: usize,
    words: Vec<u64>,
    sizes: Vec<u32>,
    assigned: Vec<u64>,
    trail: Trail,
}

impl Clone for DomainStore {
    /// Clones the current domains with a fresh trail frozen at the copy.
    fn clone(&self) -> Self {
        let mut trail = Trail::new();
        trail.freeze();
        Self {
            n_values: self.n_values,
            words_per: self.words_per,
            words: self.words.clone(),
            sizes: self.sizes.clone(),
            assigned: self.assigned.clone(),
            trail,
        }
    }
}

impl DomainStore {
    /// Seed every domain from label and arity compatibility.
    ///
    /// A target vertex is a candidate for a pattern vertex when both carry the
    /// same label and the same number of ports, so that ports map index for index.
    pub fn initialize(pattern: &Bigraph, target: &Bigraph) -> Self {
        let domains = (0..pattern.len())
            .map(|p| {
                let mut set = VertexSet::empty(target.len());
                for t in 0..target.len() {
                    if pattern.label(p) == target.label(t) && pattern.arity(p) == target.arity(t) {
                        set.insert(t);
                    }
                }
                set
            })
            .collect();
        Self::from_sets(domains, target.len())
    }

    /// Build directly from explicit candidate sets over `n_values` targets.
    pub fn from_sets(domains: Vec<VertexSet>, n_values: usize) -> Self {
        let words_per = words_for(n_values);
        let mut words = Vec::with_capacity(domains.len() * words_per);
        let mut sizes = Vec::with_capacity(domains.len());
        for set in &domains {
            debug_assert_eq!(set.universe(), n_values);
            words.extend_from_slice(set.words());
            sizes.push(set.len() as u32);
        }
        Self {
            n_values,
            words_per,
            words,
            sizes,
            assigned: vec![UNASSIGNED; domains.len()],
            trail: Trail::new(),
        }
    }

    /// Number of pattern vertices.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Number of target vertices.
    pub fn n_values(&self) -> usize {
        self.n_values
    }

    #[inline]
    pub fn words(&self, var: usize) -> &[u64] {
        &self.words[var * self.words_per..(var + 1) * self.words_per]
    }

    pub fn iter(&self, var: usize) -> BitsIter<'_> {
        BitsIter::new(self.words(var))
    }

    /// Snapshot of a domain as an owned set.
    pub fn to_set(&self, var: usize) -> VertexSet {
        let mut set = VertexSet::empty(self.n_values);
        for v in self.iter(var) {
            set.insert(v);
        }
        set
    }

    #[inline]
    pub fn size(&self, var: usize) -> usize {
        self.sizes[var] as usize
    }

    #[inline]
    pub fn contains(&self, var: usize, value: usize) -> bool {
        (self.words(var)[value / 64] >> (value % 64)) & 1 != 0
    }

    #[inline]
    pub fn assigned(&self, var: usize) -> Option<usize> {
        match self.assigned[var] {
            UNASSIGNED => None,
            v => Some(v as usize),
        }
    }

    pub fn is_assigned(&self, var: usize) -> bool {
        self.assigned[var] != UNASSIGNED
    }

    /// Remove every candidate of `var` for which `keep` is false.
    pub fn restrict(&mut self, var: usize, mut keep: impl FnMut(usize) -> bool) -> Restriction {
        let base = var * self.words_per;
        let mut changed = false;
        for w in 0..self.words_per {
            let old = self.words[base + w];
            let mut new = old;
            let mut bits = old;
            while bits != 0 {
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                if !keep(w * 64 + bit) {
                    new &= !(1u64 << bit);
                }
            }
            if new != old {
                self.write_word(var, w, new);
                changed = true;
            }
        }
        self.finish_change(var, changed)
    }

    /// Intersect the domain of `var` with `allowed`, given as words over the targets.
    pub fn intersect(&mut self, var: usize, allowed: &[u64]) -> Restriction {
        let base = var * self.words_per;
        let mut changed = false;
        for w in 0..self.words_per {
            let old = self.words[base + w];
            let new = old & allowed[w];
            if new != old {
                self.write_word(var, w, new);
                changed = true;
            }
        }
        self.finish_change(var, changed)
    }

    /// Remove every candidate set in `removed`.
    pub fn subtract(&mut self, var: usize, removed: &[u64]) -> Restriction {
        let base = var * self.words_per;
        let mut changed = false;
        for w in 0..self.words_per {
            let old = self.words[base + w];
            let new = old & !removed[w];
            if new != old {
                self.write_word(var, w, new);
                changed = true;
            }
        }
        self.finish_change(var, changed)
    }

    /// Smallest candidate.
    pub fn min(&self, var: usize) -> Option<usize> {
        self.iter(var).next()
    }

    /// Largest candidate.
    pub fn max(&self, var: usize) -> Option<usize> {
        self.words(var)
            .iter()
            .enumerate()
            .rev()
            .find(|&(_, &w)| w != 0)
            .map(|(i, &w)| i * 64 + 63 - w.leading_zeros() as usize)
    }

    /// Remove a single candidate.
    pub fn remove(&mut self, var: usize, value: usize) -> Restriction {
        if !self.contains(var, value) {
            return Restriction::Unchanged;
        }
        let w = value / 64;
        let old = self.words(var)[w];
        self.write_word(var, w, old & !(1u64 << (value % 64)));
        self.finish_change(var, true)
    }

    /// Fix `var` to `value`: its domain becomes `{value}` and it counts as assigned.
    pub fn assign(&mut self, var: usize, value: usize) {
        debug_assert!(self.contains(var, value));
        let base = var * self.words_per;
        for w in 0..self.words_per {
            let new = if w == value / 64 { 1u64 << (value % 64) } else { 0 };
            if self.words[base + w] != new {
                self.write_word(var, w, new);
            }
        }
        self.set_size(var, 1);
        self.trail
            .record_change(Slot::Assignment { var: var as u32 }, self.assigned[var]);
        self.assigned[var] = value as u64;
    }

    /// Trail position to pass back to [`undo_to`](Self::undo_to).
    pub fn mark(&self) -> usize {
        self.trail.mark()
    }

    /// Roll back every change since `mark` (never past the freeze point).
    pub fn undo_to(&mut self, mark: usize) -> usize {
        let words_per = self.words_per;
        let words = &mut self.words;
        let sizes = &mut self.sizes;
        let assigned = &mut self.assigned;
        self.trail.undo_to(mark, |slot, old| match slot {
            Slot::DomainWord { var, word } => words[var as usize * words_per + word as usize] = old,
            Slot::DomainSize { var } => sizes[var as usize] = old as u32,
            Slot::Assignment { var } => assigned[var as usize] = old,
        })
    }

    /// Make the current state the floor for all later undos.
    pub fn freeze(&mut self) {
        self.trail.freeze();
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    fn write_word(&mut self, var: usize, w: usize, new: u64) {
        let idx = var * self.words_per + w;
        self.trail.record_change(
            Slot::DomainWord {
                var: var as u32,
                word: w as u32,
            },
            self.words[idx],
        );
        self.words[idx] = new;
    }

    fn set_size(&mut self, var: usize, size: u32) {
        if self.sizes[var] != size {
            self.trail
                .record_change(Slot::DomainSize { var: var as u32 }, self.sizes[var] as u64);
            self.sizes[var] = size;
        }
    }

    fn finish_change(&mut self, var: usize, changed: bool) -> Restriction {
        if !changed {
            return Restriction::Unchanged;
        }
        let size = popcount(self.words(var)) as u32;
        self.set_size(var, size);
        if size == 0 {
            Restriction::Emptied
        } else {
            Restriction::Reduced
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(domains: &[&[usize]], n: usize) -> DomainStore {
        let sets = domains
            .iter()
            .map(|d| {
                let mut s = VertexSet::empty(n);
                for &v in *d {
                    s.insert(v);
                }
                s
            })
            .collect();
        DomainStore::from_sets(sets, n)
    }

    #[test]
    fn test_restrict_reports_emptiness() {
        let mut d = store(&[&[0, 1, 2], &[1]], 3);
        assert_eq!(d.restrict(0, |v| v != 1), Restriction::Reduced);
        assert_eq!(d.size(0), 2);
        assert_eq!(d.restrict(0, |_| true), Restriction::Unchanged);
        assert_eq!(d.restrict(1, |v| v != 1), Restriction::Emptied);
        assert_eq!(d.size(1), 0);
    }

    #[test]
    fn test_undo_restores_domains_and_assignments() {
        let mut d = store(&[&[0, 1, 2, 70], &[1, 2]], 80);
        d.freeze();
        let mark = d.mark();

        d.assign(0, 70);
        assert_eq!(d.assigned(0), Some(70));
        assert_eq!(d.iter(0).collect::<Vec<_>>(), vec![70]);
        d.remove(1, 2);
        assert_eq!(d.size(1), 1);

        d.undo_to(mark);
        assert_eq!(d.assigned(0), None);
        assert_eq!(d.iter(0).collect::<Vec<_>>(), vec![0, 1, 2, 70]);
        assert_eq!(d.size(0), 4);
        assert_eq!(d.size(1), 2);
    }

    #[test]
    fn test_intersect_with_words() {
        let mut d = store(&[&[0, 1, 2, 3]], 4);
        let mut allowed = VertexSet::empty(4);
        allowed.insert(1);
        allowed.insert(3);
        assert_eq!(d.intersect(0, allowed.words()), Restriction::Reduced);
        assert_eq!(d.to_set(0), allowed);
        assert_eq!(d.subtract(0, allowed.words()), Restriction::Emptied);
    }

    #[test]
    fn test_min_and_max() {
        let d = store(&[&[3, 64, 130], &[]], 140);
        assert_eq!(d.min(0), Some(3));
        assert_eq!(d.max(0), Some(130));
        assert_eq!(d.max(1), None);
    }

    #[test]
    fn test_initialize_matches_label_and_arity() {
        use crate::bigraph::BigraphBuilder;
        let mut p = BigraphBuilder::new("pattern");
        p.add_vertex("x", "A", 1);
        let p = p.build().unwrap();
        let mut t = BigraphBuilder::new("target");
        t.add_vertex("a", "A", 1);
        t.add_vertex("b", "A", 2);
        t.add_vertex("c", "B", 1);
        t.add_vertex("d", "A", 1);
        let t = t.build().unwrap();

        let d = DomainStore::initialize(&p, &t);
        assert_eq!(d.iter(0).collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_clone_is_frozen_copy() {
        let mut d = store(&[&[0, 1]], 2);
        d.remove(0, 0);
        let mut c = d.clone();
        assert_eq!(c.size(0), 1);
        assert_eq!(c.undo_to(0), 0);
        assert_eq!(c.size(0), 1);
    }
}
