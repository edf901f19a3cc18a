// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Structural consequences of a single assignment `u -> t`.
//!
//! Applied to every other pattern vertex, assigned or not; an assigned vertex whose
//! value is ruled out empties its (singleton) domain, which is how conflicts with
//! earlier choices surface.

use super::PropagationFailure;
use crate::domain::{DomainStore, Restriction, VertexSet};
use crate::memo::MemoizedData;

pub(crate) fn propagate_assignment(
    memo: &MemoizedData,
    store: &mut DomainStore,
    u: usize,
    t: usize,
    scratch: &mut VertexSet,
) -> Result<(), PropagationFailure> {
    injectivity(store, u, t)?;
    ancestry(memo, store, u, t)?;
    links(memo, store, u, t, scratch)?;
    supplementals(memo, store, u, t)
}

fn injectivity(store: &mut DomainStore, u: usize, t: usize) -> Result<(), PropagationFailure> {
    for w in 0..store.len() {
        if w != u && store.remove(w, t).is_emptied() {
            return Err(PropagationFailure::Injectivity { var: w, value: t });
        }
    }
    Ok(())
}

fn ancestry(memo: &MemoizedData, store: &mut DomainStore, u: usize, t: usize) -> Result<(), PropagationFailure> {
    let fail = |var| Err(PropagationFailure::Ancestry { var });
    let below = memo.target_descendants[t].words();
    let above = memo.target_ancestors[t].words();

    for &w in &memo.pattern_descendants[u] {
        if store.intersect(w, below).is_emptied() {
            return fail(w);
        }
    }
    for &w in &memo.pattern_ancestors[u] {
        if store.intersect(w, above).is_emptied() {
            return fail(w);
        }
    }
    Ok(())
}

fn links(
    memo: &MemoizedData,
    store: &mut DomainStore,
    u: usize,
    t: usize,
    scratch: &mut VertexSet,
) -> Result<(), PropagationFailure> {
    let pattern = memo.pattern.links();
    let target = memo.target.links();

    for i in 0..memo.pattern.arity(u) {
        let image_link = target.ports(target.link_of(t, i));

        // ports sharing a link with (u, i) must land on the link of (t, i)
        for port in pattern.ports(pattern.link_of(u, i)) {
            if port.vertex == u {
                continue;
            }
            scratch.clear();
            for q in image_link.iter().filter(|q| q.index == port.index) {
                scratch.insert(q.vertex);
            }
            if store.intersect(port.vertex, scratch.words()).is_emptied() {
                return Err(PropagationFailure::Link { var: port.vertex });
            }
        }

        if !memo.induced {
            continue;
        }
        // ports not sharing a link with (u, i) must stay off the link of (t, i)
        for q in image_link.iter().filter(|q| q.vertex != t) {
            for w in 0..memo.pattern.len() {
                if w == u || memo.pattern.arity(w) <= q.index || pattern.colinked(u, i, w, q.index) {
                    continue;
                }
                if store.remove(w, q.vertex) == Restriction::Emptied {
                    return Err(PropagationFailure::Link { var: w });
                }
            }
        }
    }
    Ok(())
}

fn supplementals(memo: &MemoizedData, store: &mut DomainStore, u: usize, t: usize) -> Result<(), PropagationFailure> {
    for pair in &memo.graphs {
        let allowed = pair.target.neighbours(t).words();
        for w in pair.pattern.neighbours(u).iter() {
            if store.intersect(w, allowed).is_emptied() {
                return Err(PropagationFailure::Supplemental {
                    var: w,
                    graph: pair.name,
                });
            }
        }
    }
    Ok(())
}
