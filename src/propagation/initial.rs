// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Root filtering: unary compatibility between a pattern vertex and a target vertex.
//!
//! Runs once, before any assignment. A target `t` stays in the domain of pattern
//! vertex `p` only if every check below holds:
//!
//! - same label and arity ([`DomainStore::initialize`])
//! - ports of `p` sharing a link map to ports of `t` sharing a link (and, when
//!   induced, ports on different links stay on different links)
//! - each link at a port of `t` has at least as many ports as the matching link of `p`
//! - `t` is at least as deep, and has at least as many descendants, as `p`
//! - for every graph pair: degree, and (unless disabled) neighbourhood degree sequence
//! - (unless disabled) the clique through `p` fits in the clique bound of `t`

use tracing::debug;

use super::PropagationFailure;
use crate::domain::DomainStore;
use crate::memo::bitgraph::sequence_dominated;
use crate::memo::{cliques, MemoizedData};

/// Compatibility data for one graph pair.
struct GraphFilter {
    pattern_nds: Vec<Vec<usize>>,
    target_nds: Vec<Vec<usize>>,
    pattern_clique: Vec<usize>,
    target_clique: Vec<usize>,
}

pub fn filter_domains(memo: &MemoizedData) -> Result<DomainStore, PropagationFailure> {
    let pattern = &memo.pattern;
    let target = &memo.target;
    let mut store = DomainStore::initialize(pattern, target);

    // clique detection runs on link adjacency and, when induced, its complement
    let clique_graphs = if memo.induced { 2 } else { 1 };
    let filters: Vec<GraphFilter> = memo
        .graphs
        .iter()
        .enumerate()
        .map(|(g, pair)| {
            let nds = |graph: &crate::memo::BitGraph| -> Vec<Vec<usize>> {
                if memo.rules.no_nds {
                    Vec::new()
                } else {
                    (0..graph.len()).map(|v| graph.neighbourhood_degree_sequence(v)).collect()
                }
            };
            let with_cliques = g < clique_graphs && !memo.rules.no_clique_detection;
            GraphFilter {
                pattern_nds: nds(&pair.pattern),
                target_nds: nds(&pair.target),
                pattern_clique: if with_cliques {
                    (0..pair.pattern.len()).map(|v| cliques::clique_through(&pair.pattern, v)).collect()
                } else {
                    Vec::new()
                },
                target_clique: if with_cliques {
                    (0..pair.target.len()).map(|v| cliques::clique_bound(&pair.target, v)).collect()
                } else {
                    Vec::new()
                },
            }
        })
        .collect();

    for p in 0..pattern.len() {
        let restriction = store.restrict(p, |t| {
            ports_compatible(memo, p, t)
                && place_compatible(memo, p, t)
                && memo.graphs.iter().zip(&filters).all(|(pair, filter)| {
                    pair.pattern.degree(p) <= pair.target.degree(t)
                        && (filter.pattern_nds.is_empty()
                            || sequence_dominated(&filter.pattern_nds[p], &filter.target_nds[t]))
                        && (filter.pattern_clique.is_empty()
                            || filter.pattern_clique[p] <= filter.target_clique[t])
                })
        });
        if restriction.is_emptied() {
            debug!(vertex = pattern.name(p), "no compatible target vertex");
            return Err(PropagationFailure::Compatibility { var: p });
        }
    }
    Ok(store)
}

fn ports_compatible(memo: &MemoizedData, p: usize, t: usize) -> bool {
    let pl = memo.pattern.links();
    let tl = memo.target.links();
    let arity = memo.pattern.arity(p);
    for i in 0..arity {
        if pl.ports(pl.link_of(p, i)).len() > tl.ports(tl.link_of(t, i)).len() {
            return false;
        }
        for j in i + 1..arity {
            let linked = pl.colinked(p, i, p, j);
            let image_linked = tl.colinked(t, i, t, j);
            if (linked && !image_linked) || (memo.induced && !linked && image_linked) {
                return false;
            }
        }
    }
    true
}

fn place_compatible(memo: &MemoizedData, p: usize, t: usize) -> bool {
    let pp = memo.pattern.place();
    let tp = memo.target.place();
    pp.depth(p) <= tp.depth(t) && pp.descendant_count(p) <= tp.descendant_count(t)
}
