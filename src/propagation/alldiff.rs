// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Counting all-different check over the unassigned domains.
//!
//! Vertices are taken smallest domain first, accumulating the union of their
//! domains. Fewer values than vertices is a failure. When the counts are equal
//! the accumulated values form a Hall set: those vertices will use all of them,
//! so the values are removed from every vertex that comes later.

use super::PropagationFailure;
use crate::domain::{DomainStore, Restriction, VertexSet};

/// Returns whether any domain shrank.
pub(crate) fn propagate(store: &mut DomainStore) -> Result<bool, PropagationFailure> {
    let mut vars: Vec<usize> = (0..store.len()).filter(|&v| !store.is_assigned(v)).collect();
    vars.sort_by_key(|&v| store.size(v));

    let mut union = VertexSet::empty(store.n_values());
    let mut hall = VertexSet::empty(store.n_values());
    let mut pending = 0;
    let mut changed = false;

    for v in vars {
        match store.subtract(v, hall.words()) {
            Restriction::Emptied => {
                let values = hall.len();
                return Err(PropagationFailure::AllDifferent {
                    vars: values + 1,
                    values,
                });
            }
            Restriction::Reduced => changed = true,
            Restriction::Unchanged => {}
        }
        union.union_with_words(store.words(v));
        pending += 1;

        let values = union.len();
        if values < pending {
            return Err(PropagationFailure::AllDifferent { vars: pending, values });
        }
        if values == pending {
            hall.union_with(&union);
            union.clear();
            pending = 0;
        }
    }
    Ok(changed)
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
    fn test_pigeonhole_fails() {
        let mut d = store(&[&[0, 1], &[0, 1], &[0, 1]], 3);
        assert_eq!(
            propagate(&mut d),
            Err(PropagationFailure::AllDifferent { vars: 3, values: 2 })
        );
    }

    #[test]
    fn test_hall_set_values_removed_from_others() {
        let mut d = store(&[&[0, 1], &[0, 1], &[0, 1, 2, 3]], 4);
        assert_eq!(propagate(&mut d), Ok(true));
        assert_eq!(d.iter(2).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn test_assigned_vertices_are_ignored() {
        let mut d = store(&[&[0], &[0, 1]], 2);
        d.assign(0, 0);
        assert_eq!(propagate(&mut d), Ok(false));
    }

    #[test]
    fn test_nothing_to_do() {
        let mut d = store(&[&[0, 1, 2], &[1, 2, 3]], 4);
        assert_eq!(propagate(&mut d), Ok(false));
        assert_eq!(d.size(0), 3);
    }
}
