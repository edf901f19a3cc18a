// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Tier 1: MEMO data (immutable, precomputed once per solve).
//!
//! Everything the propagators look up but never change: the two bigraphs, the
//! supplemental graph pairs, ancestry bitsets for the target, ancestry lists for
//! the pattern, symmetry constraints and the split of pattern vertices into
//! searched and isolated ones. Workers share one instance by reference.

pub mod bitgraph;
pub mod cliques;

pub use bitgraph::BitGraph;

use tracing::debug;

use crate::bigraph::Bigraph;
use crate::config::{RuleToggles, SolverParams};
use crate::domain::VertexSet;

/// A derived pattern graph and the target graph its edges must land on.
#[derive(Debug, Clone)]
pub struct GraphPair {
    pub name: &'static str,
    pub pattern: BitGraph,
    pub target: BitGraph,
}

impl GraphPair {
    fn derive(&self, name: &'static str, f: impl Fn(&BitGraph) -> BitGraph) -> Self {
        Self {
            name,
            pattern: f(&self.pattern),
            target: f(&self.target),
        }
    }
}

/// Immutable precomputed data shared by every search worker.
#[derive(Debug, Clone)]
pub struct MemoizedData {
    pub pattern: Bigraph,
    pub target: Bigraph,
    pub induced: bool,
    pub rules: RuleToggles,

    /// `graphs[0]` is link adjacency; the rest are supplementals.
    pub graphs: Vec<GraphPair>,

    /// Strict ancestors / descendants of each target vertex.
    pub target_ancestors: Vec<VertexSet>,
    pub target_descendants: Vec<VertexSet>,

    /// Per pattern vertex: its strict ancestors and strict descendants.
    pub pattern_ancestors: Vec<Vec<usize>>,
    pub pattern_descendants: Vec<Vec<usize>>,

    /// `(v, w)`: the image of `v` must have a smaller index than the image of `w`.
    pub less_than: Vec<(usize, usize)>,

    /// Pattern vertices the engine branches on.
    pub search_vars: Vec<usize>,
    /// Pattern vertices with no structure at all, placed by matching after the search.
    pub isolated: Vec<usize>,
}

impl MemoizedData {
    /// Precompute everything for one solve.
    ///
    /// `every_embedding` is set when each distinct embedding must reach a leaf,
    /// as when counting or when an oracle judges them one by one. It disables
    /// isolated-vertex removal, which would otherwise collapse them into one.
    pub fn new(
        pattern: &Bigraph,
        target: &Bigraph,
        params: &SolverParams,
        less_than: Vec<(usize, usize)>,
        every_embedding: bool,
    ) -> Self {
        let induced = params.induced;
        let rules = params.rules;

        let base = GraphPair {
            name: "links",
            pattern: BitGraph::from_links(pattern),
            target: BitGraph::from_links(target),
        };
        let mut graphs = Vec::new();
        if !rules.no_supplementals {
            graphs.push(base.derive("paths>=2", |g| g.with_path_count(2)));
            graphs.push(base.derive("paths>=3", |g| g.with_path_count(3)));
        }
        if induced {
            let complement = base.derive("complement", BitGraph::complement);
            if !rules.no_supplementals {
                graphs.push(complement.derive("complement paths>=2", |g| g.with_path_count(2)));
            }
            graphs.insert(0, complement);
        }
        graphs.insert(0, base);

        let (target_ancestors, target_descendants) = ancestry_sets(target);

        let n = pattern.len();
        let mut pattern_ancestors = vec![Vec::new(); n];
        let mut pattern_descendants = vec![Vec::new(); n];
        for u in 0..n {
            for w in 0..n {
                if u == w {
                    continue;
                }
                if pattern.is_ancestor(w, u) {
                    pattern_ancestors[u].push(w);
                } else if pattern.is_ancestor(u, w) {
                    pattern_descendants[u].push(w);
                }
            }
        }

        let remove_isolated = !induced && !every_embedding && !rules.no_isolated_vertex_removal;
        let (isolated, search_vars): (Vec<usize>, Vec<usize>) = (0..n).partition(|&v| {
            remove_isolated
                && pattern.parent(v).is_none()
                && pattern.children(v).is_empty()
                && pattern.links().neighbours(v).is_empty()
                && !less_than.iter().any(|&(a, b)| a == v || b == v)
        });

        debug!(
            graphs = graphs.len(),
            search_vars = search_vars.len(),
            isolated = isolated.len(),
            "memoized data ready"
        );

        Self {
            pattern: pattern.clone(),
            target: target.clone(),
            induced,
            rules,
            graphs,
            target_ancestors,
            target_descendants,
            pattern_ancestors,
            pattern_descendants,
            less_than,
            search_vars,
            isolated,
        }
    }

    pub fn pattern_len(&self) -> usize {
        self.pattern.len()
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    /// Degree in the link adjacency graph, used for ordering decisions.
    pub fn pattern_degree(&self, v: usize) -> usize {
        self.graphs[0].pattern.degree(v)
    }

    pub fn target_degree(&self, t: usize) -> usize {
        self.graphs[0].target.degree(t)
    }
}

fn ancestry_sets(graph: &Bigraph) -> (Vec<VertexSet>, Vec<VertexSet>) {
    let n = graph.len();
    let mut ancestors = vec![VertexSet::empty(n); n];
    let mut descendants = vec![VertexSet::empty(n); n];
    for v in 0..n {
        let mut up = graph.parent(v);
        while let Some(a) = up {
            ancestors[v].insert(a);
            descendants[a].insert(v);
            up = graph.parent(a);
        }
    }
    (ancestors, descendants)
}
