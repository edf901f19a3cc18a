// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Simple graphs over bigraph vertices, stored as one [`VertexSet`] row per vertex.
//!
//! The link hypergraph is flattened to plain adjacency (two vertices are adjacent
//! when some link touches both). Supplemental graphs are derived from that base:
//! "at least k distinct paths of length two" graphs and, for induced search, the
//! complement. Every derived pattern edge must map onto the matching derived
//! target edge under any embedding, which is what makes them usable for pruning.

use crate::bigraph::Bigraph;
use crate::domain::VertexSet;

/// Symmetric, loop-free adjacency matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGraph {
    rows: Vec<VertexSet>,
}

impl BitGraph {
    pub fn empty(n: usize) -> Self {
        Self {
            rows: vec![VertexSet::empty(n); n],
        }
    }

    /// Link adjacency of a bigraph.
    pub fn from_links(graph: &Bigraph) -> Self {
        let mut result = Self::empty(graph.len());
        for v in 0..graph.len() {
            for &w in graph.links().neighbours(v) {
                result.rows[v].insert(w);
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_edge(&mut self, u: usize, v: usize) {
        if u != v {
            self.rows[u].insert(v);
            self.rows[v].insert(u);
        }
    }

    #[inline]
    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        self.rows[u].contains(v)
    }

    #[inline]
    pub fn neighbours(&self, v: usize) -> &VertexSet {
        &self.rows[v]
    }

    pub fn degree(&self, v: usize) -> usize {
        self.rows[v].len()
    }

    /// Every non-edge between distinct vertices becomes an edge.
    pub fn complement(&self) -> Self {
        let n = self.len();
        let rows = (0..n)
            .map(|v| {
                let mut row = VertexSet::full(n);
                row.difference_with(&self.rows[v]);
                row.remove(v);
                row
            })
            .collect();
        Self { rows }
    }

    /// Edge `u - w` whenever `u` and `w` have at least `k` common neighbours.
    pub fn with_path_count(&self, k: usize) -> Self {
        let n = self.len();
        let mut result = Self::empty(n);
        let mut counts = vec![0usize; n];
        let mut touched = Vec::new();
        for u in 0..n {
            for c in self.rows[u].iter() {
                for w in self.rows[c].iter() {
                    if w == u {
                        continue;
                    }
                    if counts[w] == 0 {
                        touched.push(w);
                    }
                    counts[w] += 1;
                }
            }
            for w in touched.drain(..) {
                if counts[w] >= k {
                    result.rows[u].insert(w);
                }
                counts[w] = 0;
            }
        }
        result
    }

    /// Degrees of the neighbours of `v`, largest first.
    pub fn neighbourhood_degree_sequence(&self, v: usize) -> Vec<usize> {
        let mut seq: Vec<usize> = self.rows[v].iter().map(|w| self.degree(w)).collect();
        seq.sort_unstable_by(|a, b| b.cmp(a));
        seq
    }
}

/// True when `pattern` fits element-wise under `target` (both sorted descending).
pub fn sequence_dominated(pattern: &[usize], target: &[usize]) -> bool {
    pattern.len() <= target.len() && pattern.iter().zip(target).all(|(p, t)| p <= t)
}
