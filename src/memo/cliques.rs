// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Clique sizes around each vertex, used to rule out targets at the root.
//!
//! A clique through pattern vertex `p` maps onto a clique through its image, so a
//! target vertex `t` is only a candidate when the largest clique through `t` can be
//! at least as large. Pattern side: exact search with a node budget (a lower bound
//! when the budget runs out). Target side: a greedy colouring of the neighbourhood
//! gives an upper bound.

use super::bitgraph::BitGraph;
use crate::domain::VertexSet;

/// Branch-and-bound nodes spent per pattern vertex before settling for the best so far.
const CLIQUE_NODE_BUDGET: usize = 20_000;

/// Size of the largest clique containing `v`, or a lower bound when the search is cut short.
pub fn clique_through(graph: &BitGraph, v: usize) -> usize {
    let mut best = 1;
    let mut budget = CLIQUE_NODE_BUDGET;
    expand(graph, graph.neighbours(v).clone(), 1, &mut best, &mut budget);
    best
}

fn expand(graph: &BitGraph, candidates: VertexSet, size: usize, best: &mut usize, budget: &mut usize) {
    if candidates.is_empty() {
        *best = (*best).max(size);
        return;
    }
    let mut remaining = candidates;
    while let Some(w) = remaining.first() {
        if *budget == 0 || size + remaining.len() <= *best {
            return;
        }
        *budget -= 1;
        let mut next = remaining.clone();
        next.intersect_with(graph.neighbours(w));
        expand(graph, next, size + 1, best, budget);
        remaining.remove(w);
    }
}

/// Upper bound on the largest clique containing `v`: colours in a greedy colouring
/// of its neighbourhood, plus one for `v` itself.
pub fn clique_bound(graph: &BitGraph, v: usize) -> usize {
    let mut order: Vec<usize> = graph.neighbours(v).iter().collect();
    order.sort_by_key(|&w| std::cmp::Reverse(graph.degree(w)));

    let mut colour_classes: Vec<VertexSet> = Vec::new();
    for w in order {
        let free = colour_classes
            .iter_mut()
            .find(|class| class.intersection_len(graph.neighbours(w)) == 0);
        match free {
            Some(class) => class.insert(w),
            None => {
                let mut class = VertexSet::empty(graph.len());
                class.insert(w);
                colour_classes.push(class);
            }
        }
    }
    colour_classes.len() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(n: usize) -> BitGraph {
        let mut g = BitGraph::empty(n);
        for u in 0..n {
            for v in u + 1..n {
                g.add_edge(u, v);
            }
        }
        g
    }

    #[test]
    fn test_clique_in_complete_graph() {
        let g = complete(5);
        assert_eq!(clique_through(&g, 0), 5);
        assert_eq!(clique_bound(&g, 0), 5);
    }

    #[test]
    fn test_triangle_with_tail() {
        let mut g = BitGraph::empty(4);
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 0);
        g.add_edge(2, 3);
        assert_eq!(clique_through(&g, 0), 3);
        assert_eq!(clique_through(&g, 3), 2);
        assert!(clique_bound(&g, 2) >= 3);
    }

    #[test]
    fn test_isolated_vertex() {
        let g = BitGraph::empty(3);
        assert_eq!(clique_through(&g, 1), 1);
        assert_eq!(clique_bound(&g, 1), 1);
    }

    #[test]
    fn test_bound_never_below_exact() {
        // 5-cycle: clique number 2, greedy bound may be 3
        let mut g = BitGraph::empty(5);
        for v in 0..5 {
            g.add_edge(v, (v + 1) % 5);
        }
        for v in 0..5 {
            assert!(clique_bound(&g, v) >= clique_through(&g, v));
        }
    }
}
