// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Constraint propagation for embedding search.
//!
//! # Algorithm Overview
//!
//! When a pattern vertex `u` is assigned target `t`:
//! 1. Apply the structural rules of `u -> t` to every other pattern vertex
//!    (injectivity, ancestry, links, supplemental graphs)
//! 2. Apply the global rules: symmetry-breaking bounds, nogoods, all-different
//! 3. If any unassigned vertex is down to **exactly one candidate**, assign it
//!    and go back to step 1 for that assignment (CASCADE)
//! 4. Fail immediately if any domain becomes empty
//!
//! The loop ends at a fixpoint: no queued assignments and no global rule made
//! progress. Every structural step counts as one propagation.

pub mod alldiff;
pub mod errors;
pub mod initial;
pub mod less_than;
pub mod nogoods;
pub mod structure;

pub use errors::{FailureKind, PropagationFailure};

use crate::context::SearchContext;
use crate::domain::VertexSet;
use crate::state::Counters;

/// Assign `var := value` and propagate to a fixpoint.
///
/// Returns the number of propagation steps on success. On failure the store is
/// left part-way; the caller undoes to its mark.
pub fn assign_and_propagate(ctx: &mut SearchContext<'_>, var: usize, value: usize) -> Result<u64, PropagationFailure> {
    ctx.store.assign(var, value);
    fixpoint(ctx, vec![(var, value)])
}

/// Propagate the current state with no new assignment: used at the root and
/// after a restart, when nogoods may have been added.
pub fn propagate_root(ctx: &mut SearchContext<'_>) -> Result<u64, PropagationFailure> {
    fixpoint(ctx, Vec::new())
}

fn fixpoint(ctx: &mut SearchContext<'_>, mut queue: Vec<(usize, usize)>) -> Result<u64, PropagationFailure> {
    let memo = ctx.memo;
    let mut scratch = VertexSet::empty(memo.target_len());
    let mut steps = 0;
    loop {
        while let Some((u, t)) = queue.pop() {
            steps += 1;
            ctx.statistics.increment(Counters::Propagations);
            structure::propagate_assignment(memo, &mut ctx.store, u, t, &mut scratch)?;
        }

        let mut changed = less_than::propagate(memo, &mut ctx.store)?;
        changed |= ctx.nogoods.propagate(&mut ctx.store)?;
        changed |= alldiff::propagate(&mut ctx.store)?;

        // unit-domain cascade
        for v in 0..ctx.store.len() {
            if !ctx.store.is_assigned(v) && ctx.store.size(v) == 1 {
                if let Some(t) = ctx.store.min(v) {
                    ctx.store.assign(v, t);
                    queue.push((v, t));
                }
            }
        }

        if queue.is_empty() && !changed {
            return Ok(steps);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigraph::{Bigraph, BigraphBuilder};
    use crate::config::SolverParams;
    use crate::memo::MemoizedData;

    /// Chain a - b - c of arity-2 vertices.
    fn chain(role: &str, n: usize) -> Bigraph {
        let mut b = BigraphBuilder::new(role);
        for i in 0..n {
            b.add_vertex(&format!("v{}", i), "A", 2);
        }
        for i in 1..n {
            b.add_link(&[(i - 1, 1), (i, 0)]);
        }
        b.build().unwrap()
    }

    fn memo(pattern: &Bigraph, target: &Bigraph) -> MemoizedData {
        let params = SolverParams {
            induced: false,
            ..SolverParams::default()
        };
        MemoizedData::new(pattern, target, &params, Vec::new(), true)
    }

    #[test]
    fn test_assignment_cascades_along_links() {
        let p = chain("pattern", 3);
        let t = chain("target", 4);
        let m = memo(&p, &t);
        let mut ctx = SearchContext::new(&m).unwrap();
        propagate_root(&mut ctx).unwrap();
        ctx.store.freeze();

        let steps = assign_and_propagate(&mut ctx, 0, 1).unwrap();
        // port 1 of v0 forces v1 and then v2
        assert_eq!(ctx.assignment(), vec![Some(1), Some(2), Some(3)]);
        assert_eq!(steps, 3);
        assert_eq!(ctx.statistics.get(Counters::Propagations), 3);
    }

    #[test]
    fn test_failure_is_undone_by_mark() {
        let p = chain("pattern", 3);
        let t = chain("target", 4);
        let m = memo(&p, &t);
        let mut ctx = SearchContext::new(&m).unwrap();
        propagate_root(&mut ctx).unwrap();
        ctx.store.freeze();
        let before: Vec<usize> = (0..3).map(|v| ctx.store.size(v)).collect();

        let mark = ctx.store.mark();
        // v0 on v2 pushes v1 onto v3, which has no room for v2
        assert!(assign_and_propagate(&mut ctx, 0, 2).is_err());
        ctx.store.undo_to(mark);
        let after: Vec<usize> = (0..3).map(|v| ctx.store.size(v)).collect();
        assert_eq!(before, after);
        assert_eq!(ctx.assignment(), vec![None, None, None]);
    }

    #[test]
    fn test_root_filtering_rejects_unlinked_targets() {
        let p = chain("pattern", 3);
        let mut t = BigraphBuilder::new("target");
        t.add_vertex("a", "A", 2);
        t.add_vertex("b", "A", 2);
        let t = t.build().unwrap();
        let params = SolverParams {
            induced: false,
            rules: crate::config::RuleToggles {
                no_nds: true,
                no_clique_detection: true,
                no_supplementals: true,
                no_isolated_vertex_removal: true,
            },
            ..SolverParams::default()
        };
        let m = MemoizedData::new(&p, &t, &params, Vec::new(), true);
        // neither target has a port on a shared link
        assert!(SearchContext::new(&m).is_err());
    }
}
