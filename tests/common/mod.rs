// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use bigraph_match::engine::verify_mapping;
use bigraph_match::{Bigraph, BigraphBuilder};
use proptest::collection::vec;
use proptest::prelude::*;

/// `n` unlinked, unparented vertices of label `A` and arity 0.
pub fn loose(role: &str, n: usize) -> Bigraph {
    let mut b = BigraphBuilder::new(role);
    for i in 0..n {
        b.add_vertex(&format!("v{}", i), "A", 0);
    }
    b.build().unwrap()
}

/// Ring of `n` arity-2 vertices: port 1 of each joined to port 0 of the next.
pub fn ring(role: &str, n: usize) -> Bigraph {
    let mut b = BigraphBuilder::new(role);
    for i in 0..n {
        b.add_vertex(&format!("v{}", i), "A", 2);
    }
    for i in 0..n {
        b.add_link(&[(i, 1), ((i + 1) % n, 0)]);
    }
    b.build().unwrap()
}

/// A parent `p` with one child `c`, both arity 1, sharing a link.
pub fn linked_parent_child(role: &str) -> Bigraph {
    let mut b = BigraphBuilder::new(role);
    let p = b.add_vertex("p", "A", 1);
    let c = b.add_vertex("c", "A", 1);
    b.set_parent(c, p);
    b.add_link(&[(p, 0), (c, 0)]);
    b.build().unwrap()
}

/// Every injective map from pattern to target that passes the independent
/// checker, as image vectors in lexicographic order.
pub fn brute_force(pattern: &Bigraph, target: &Bigraph, induced: bool) -> Vec<Vec<usize>> {
    fn extend(
        pattern: &Bigraph,
        target: &Bigraph,
        induced: bool,
        images: &mut Vec<usize>,
        used: &mut [bool],
        found: &mut Vec<Vec<usize>>,
    ) {
        if images.len() == pattern.len() {
            if verify_mapping(pattern, target, induced, images).is_ok() {
                found.push(images.clone());
            }
            return;
        }
        for t in 0..target.len() {
            if used[t] {
                continue;
            }
            used[t] = true;
            images.push(t);
            extend(pattern, target, induced, images, used, found);
            images.pop();
            used[t] = false;
        }
    }
    let mut found = Vec::new();
    let mut used = vec![false; target.len()];
    extend(pattern, target, induced, &mut Vec::new(), &mut used, &mut found);
    found
}

/// Build a bigraph from raw choices; out-of-range choices are ignored so any
/// generated input is valid.
pub fn assemble(role: &str, n: usize, labels: &[u8], arities: &[usize], parents: &[usize], link_ids: &[usize]) -> Bigraph {
    let mut b = BigraphBuilder::new(role);
    for v in 0..n {
        let label = if labels[v] == 0 { "A" } else { "B" };
        b.add_vertex(&format!("{}{}", role, v), label, arities[v]);
    }
    for v in 1..n {
        if parents[v] < v {
            b.set_parent(v, parents[v]);
        }
    }
    let mut groups: Vec<Vec<(usize, usize)>> = vec![Vec::new(); 4];
    let mut k = 0;
    for v in 0..n {
        for i in 0..arities[v] {
            groups[link_ids[k] % 4].push((v, i));
            k += 1;
        }
    }
    for group in groups.iter().filter(|g| !g.is_empty()) {
        b.add_link(group);
    }
    b.build().unwrap()
}

/// Random valid bigraphs with up to `max_n` vertices of arity at most 2.
pub fn bigraph_strategy(role: &'static str, max_n: usize) -> impl Strategy<Value = Bigraph> {
    (
        1..=max_n,
        vec(0u8..2, max_n),
        vec(0usize..3, max_n),
        vec(0usize..=max_n, max_n),
        vec(0usize..4, 2 * max_n),
    )
        .prop_map(move |(n, labels, arities, parents, link_ids)| {
            assemble(role, n, &labels, &arities, &parents, &link_ids)
        })
}
