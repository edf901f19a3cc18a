// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Bounds propagation for symmetry-breaking `image(v) < image(w)` constraints.

use super::PropagationFailure;
use crate::domain::{DomainStore, Restriction};
use crate::memo::MemoizedData;

/// Returns whether any domain shrank.
pub(crate) fn propagate(memo: &MemoizedData, store: &mut DomainStore) -> Result<bool, PropagationFailure> {
    let mut changed = false;
    for &(v, w) in &memo.less_than {
        changed |= bound(store, v, w)?;
    }
    Ok(changed)
}

fn bound(store: &mut DomainStore, v: usize, w: usize) -> Result<bool, PropagationFailure> {
    let Some(lowest) = store.min(v) else {
        return Err(PropagationFailure::LessThan { var: v });
    };
    let above = store.restrict(w, |x| x > lowest);
    if above.is_emptied() {
        return Err(PropagationFailure::LessThan { var: w });
    }
    let Some(highest) = store.max(w) else {
        return Err(PropagationFailure::LessThan { var: w });
    };
    let below = store.restrict(v, |x| x < highest);
    if below.is_emptied() {
        return Err(PropagationFailure::LessThan { var: v });
    }
    Ok(above == Restriction::Reduced || below == Restriction::Reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VertexSet;

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
    fn test_bounds_tighten_both_sides() {
        let mut d = store(&[&[1, 2, 3], &[0, 1, 2]], 4);
        assert_eq!(bound(&mut d, 0, 1), Ok(true));
        assert_eq!(d.iter(1).collect::<Vec<_>>(), vec![2]);
        assert_eq!(d.iter(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(bound(&mut d, 0, 1), Ok(false));
    }

    #[test]
    fn test_impossible_order_fails() {
        let mut d = store(&[&[2, 3], &[0, 1, 2]], 4);
        assert_eq!(bound(&mut d, 0, 1), Err(PropagationFailure::LessThan { var: 1 }));
    }
}
