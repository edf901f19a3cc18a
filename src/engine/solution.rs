// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Completing, checking and reporting solutions.

use crossbeam::channel::Sender;

use crate::bigraph::Bigraph;
use crate::domain::DomainStore;

/// Receives each accepted mapping while counting.
///
/// Mappings are `(pattern vertex, target vertex)` pairs in pattern order. Return
/// `false` to stop the search.
pub trait SolutionSink: Sync {
    fn accept(&self, mapping: &[(usize, usize)]) -> bool;
}

impl<F> SolutionSink for F
where
    F: Fn(&[(usize, usize)]) -> bool + Sync,
{
    fn accept(&self, mapping: &[(usize, usize)]) -> bool {
        self(mapping)
    }
}

/// Stream mappings to another thread; a closed channel stops the search.
impl SolutionSink for Sender<Vec<(usize, usize)>> {
    fn accept(&self, mapping: &[(usize, usize)]) -> bool {
        self.send(mapping.to_vec()).is_ok()
    }
}

/// Place the still unassigned `vars` onto distinct values of their domains,
/// avoiding values already taken by assigned variables.
///
/// Kuhn's augmenting paths; `None` when no such placement exists.
pub fn place_unassigned(store: &DomainStore, vars: &[usize]) -> Option<Vec<(usize, usize)>> {
    let mut taken = vec![false; store.n_values()];
    for v in 0..store.len() {
        if let Some(t) = store.assigned(v) {
            taken[t] = true;
        }
    }
    let candidates: Vec<Vec<usize>> = vars
        .iter()
        .map(|&v| store.iter(v).filter(|&t| !taken[t]).collect())
        .collect();

    let mut owner: Vec<Option<usize>> = vec![None; store.n_values()];
    for i in 0..vars.len() {
        let mut visited = vec![false; store.n_values()];
        if !augment(i, &candidates, &mut owner, &mut visited) {
            return None;
        }
    }

    let mut placed = vec![0; vars.len()];
    for (t, slot) in owner.iter().enumerate() {
        if let Some(i) = *slot {
            placed[i] = t;
        }
    }
    Some(vars.iter().copied().zip(placed).collect())
}

fn augment(i: usize, candidates: &[Vec<usize>], owner: &mut [Option<usize>], visited: &mut [bool]) -> bool {
    for &t in &candidates[i] {
        if visited[t] {
            continue;
        }
        visited[t] = true;
        let free = match owner[t] {
            None => true,
            Some(j) => augment(j, candidates, owner, visited),
        };
        if free {
            owner[t] = Some(i);
            return true;
        }
    }
    false
}

/// Check a complete mapping (`images[p]` is the target of pattern vertex `p`)
/// against every embedding condition, independently of propagation.
pub fn verify_mapping(pattern: &Bigraph, target: &Bigraph, induced: bool, images: &[usize]) -> Result<(), String> {
    if images.len() != pattern.len() {
        return Err(format!("{} images for {} pattern vertices", images.len(), pattern.len()));
    }

    let mut preimage: Vec<Option<usize>> = vec![None; target.len()];
    for (p, &t) in images.iter().enumerate() {
        if t >= target.len() {
            return Err(format!("{} mapped outside the target", pattern.name(p)));
        }
        if let Some(q) = preimage[t] {
            return Err(format!(
                "{} and {} both map to {}",
                pattern.name(q),
                pattern.name(p),
                target.name(t)
            ));
        }
        preimage[t] = Some(p);
        if pattern.label(p) != target.label(t) || pattern.arity(p) != target.arity(t) {
            return Err(format!("{} is incompatible with {}", pattern.name(p), target.name(t)));
        }
    }

    for (p, &t) in images.iter().enumerate() {
        for (q, &s) in images.iter().enumerate() {
            if p == q {
                continue;
            }
            if pattern.is_ancestor(p, q) && !target.is_ancestor(t, s) {
                return Err(format!("{} lost its descendant {}", pattern.name(p), pattern.name(q)));
            }
        }
    }

    let pattern_links = pattern.links();
    let target_links = target.links();
    for link in 0..pattern_links.link_count() {
        let ports = pattern_links.ports(link);
        let Some(first) = ports.first() else { continue };
        let image_link = target_links.link_of(images[first.vertex], first.index);
        for port in &ports[1..] {
            if target_links.link_of(images[port.vertex], port.index) != image_link {
                return Err(format!(
                    "link of {} port {} is split in the target",
                    pattern.name(port.vertex),
                    port.index
                ));
            }
        }
    }

    if induced {
        for (p, &t) in images.iter().enumerate() {
            for i in 0..pattern.arity(p) {
                let link = target_links.link_of(t, i);
                for port in target_links.ports(link) {
                    let Some(q) = preimage[port.vertex] else { continue };
                    if !pattern_links.colinked(p, i, q, port.index) {
                        return Err(format!(
                            "{} port {} and {} port {} are joined only in the target",
                            pattern.name(p),
                            i,
                            pattern.name(q),
                            port.index
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bigraph::BigraphBuilder;
    use crate::domain::VertexSet;

    /// Two linked arity-1 vertices under a root `r`.
    fn pair(role: &str) -> Bigraph {
        let mut b = BigraphBuilder::new(role);
        let r = b.add_vertex("r", "R", 0);
        let x = b.add_vertex("x", "A", 1);
        let y = b.add_vertex("y", "A", 1);
        b.set_parent(x, r);
        b.set_parent(y, r);
        b.add_link(&[(x, 0), (y, 0)]);
        b.build().unwrap()
    }

    #[test]
    fn test_verify_accepts_identity_and_swap() {
        let g = pair("g");
        assert_eq!(verify_mapping(&g, &g, true, &[0, 1, 2]), Ok(()));
        assert_eq!(verify_mapping(&g, &g, true, &[0, 2, 1]), Ok(()));
    }

    #[test]
    fn test_verify_rejects_broken_mappings() {
        let g = pair("g");
        assert!(verify_mapping(&g, &g, true, &[0, 1, 1]).is_err());
        assert!(verify_mapping(&g, &g, true, &[1, 0, 2]).is_err());

        // target where x and y are not linked
        let mut b = BigraphBuilder::new("t");
        let r = b.add_vertex("r", "R", 0);
        let x = b.add_vertex("x", "A", 1);
        let y = b.add_vertex("y", "A", 1);
        b.set_parent(x, r);
        b.set_parent(y, r);
        let unlinked = b.build().unwrap();
        assert!(verify_mapping(&g, &unlinked, false, &[0, 1, 2]).is_err());
        // and the reverse direction only matters when induced
        assert!(verify_mapping(&unlinked, &g, false, &[0, 1, 2]).is_ok());
        assert!(verify_mapping(&unlinked, &g, true, &[0, 1, 2]).is_err());
    }

    #[test]
    fn test_verify_lets_unrelated_vertices_nest() {
        let mut b = BigraphBuilder::new("pattern");
        b.add_vertex("x", "A", 0);
        b.add_vertex("y", "A", 0);
        let roots = b.build().unwrap();

        let mut b = BigraphBuilder::new("target");
        let a = b.add_vertex("a", "A", 0);
        let c = b.add_vertex("b", "A", 0);
        b.set_parent(c, a);
        let nested = b.build().unwrap();

        assert_eq!(verify_mapping(&roots, &nested, true, &[0, 1]), Ok(()));
        assert_eq!(verify_mapping(&roots, &nested, true, &[1, 0]), Ok(()));
        // but a parent may not end up below its child
        assert!(verify_mapping(&nested, &nested, true, &[1, 0]).is_err());
    }

    #[test]
    fn test_placement_uses_augmenting_paths() {
        let mut first = VertexSet::empty(3);
        first.insert(0);
        first.insert(1);
        let mut second = VertexSet::empty(3);
        second.insert(0);
        let mut third = VertexSet::empty(3);
        third.insert(2);
        let mut store = DomainStore::from_sets(vec![first, second, third], 3);
        store.assign(2, 2);

        let placed = place_unassigned(&store, &[0, 1]).unwrap();
        assert_eq!(placed, vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn test_placement_fails_without_room() {
        let mut only = VertexSet::empty(2);
        only.insert(0);
        let store = DomainStore::from_sets(vec![only.clone(), only], 2);
        assert_eq!(place_unassigned(&store, &[0, 1]), None);
    }

    #[test]
    fn test_closures_and_channels_are_sinks() {
        let count = std::sync::atomic::AtomicUsize::new(0);
        let sink = |_: &[(usize, usize)]| count.fetch_add(1, std::sync::atomic::Ordering::Relaxed) < 1;
        assert!(sink.accept(&[(0, 0)]));
        assert!(!sink.accept(&[(0, 0)]));

        let (tx, rx) = crossbeam::channel::unbounded();
        assert!(tx.accept(&[(0, 3)]));
        assert_eq!(rx.recv().unwrap(), vec![(0, 3)]);
        drop(rx);
        assert!(!tx.accept(&[(0, 3)]));
    }
}
