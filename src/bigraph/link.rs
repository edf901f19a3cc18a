// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Link hypergraph: connectivity between vertex ports.
//!
//! Every port `(vertex, index)` with `index < arity(vertex)` belongs to exactly one
//! link. Ports that the caller never mentions get a singleton link of their own.

use serde::{Deserialize, Serialize};

/// A single port of a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Port {
    pub vertex: usize,
    pub index: usize,
}

impl Port {
    pub fn new(vertex: usize, index: usize) -> Self {
        Self { vertex, index }
    }
}

/// Hyperedges over ports, plus the derived vertex adjacency.
#[derive(Debug, Clone)]
pub struct LinkHypergraph {
    links: Vec<Vec<Port>>,
    /// `port_links[v][i]` is the link holding port `(v, i)`.
    port_links: Vec<Vec<usize>>,
    /// Sorted distinct vertices sharing at least one link with `v` (excluding `v`).
    neighbours: Vec<Vec<usize>>,
}

impl LinkHypergraph {
    /// Build from per-vertex arities and the explicitly given links.
    pub(crate) fn new(arities: &[usize], given: Vec<Vec<Port>>) -> Result<Self, String> {
        const UNSET: usize = usize::MAX;
        let mut port_links: Vec<Vec<usize>> = arities.iter().map(|&a| vec![UNSET; a]).collect();
        let mut links = Vec::with_capacity(given.len());

        for ports in given {
            let link_id = links.len();
            for port in &ports {
                let Some(slots) = port_links.get_mut(port.vertex) else {
                    return Err(format!(
                        "link {} names vertex {} but there are only {} vertices",
                        link_id,
                        port.vertex,
                        arities.len()
                    ));
                };
                let Some(slot) = slots.get_mut(port.index) else {
                    return Err(format!(
                        "link {} names port {} of vertex {}, which has arity {}",
                        link_id, port.index, port.vertex, arities[port.vertex]
                    ));
                };
                if *slot != UNSET {
                    return Err(format!(
                        "port {} of vertex {} belongs to links {} and {}",
                        port.index, port.vertex, *slot, link_id
                    ));
                }
                *slot = link_id;
            }
            links.push(ports);
        }

        // Idle ports each get a closed singleton link
        for (v, slots) in port_links.iter_mut().enumerate() {
            for (i, slot) in slots.iter_mut().enumerate() {
                if *slot == UNSET {
                    *slot = links.len();
                    links.push(vec![Port::new(v, i)]);
                }
            }
        }

        let mut neighbours = vec![Vec::new(); arities.len()];
        for ports in &links {
            for a in ports {
                for b in ports {
                    if a.vertex != b.vertex {
                        neighbours[a.vertex].push(b.vertex);
                    }
                }
            }
        }
        for list in &mut neighbours {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self {
            links,
            port_links,
            neighbours,
        })
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn ports(&self, link: usize) -> &[Port] {
        &self.links[link]
    }

    /// Link of each port of `v`, indexed by port number.
    pub fn port_links(&self, v: usize) -> &[usize] {
        &self.port_links[v]
    }

    #[inline]
    pub fn link_of(&self, v: usize, port: usize) -> usize {
        self.port_links[v][port]
    }

    /// True when ports `(u, i)` and `(v, j)` are on the same link.
    #[inline]
    pub fn colinked(&self, u: usize, i: usize, v: usize, j: usize) -> bool {
        self.port_links[u][i] == self.port_links[v][j]
    }

    pub fn neighbours(&self, v: usize) -> &[usize] {
        &self.neighbours[v]
    }

    /// True when `u` and `v` share a link. A vertex is never adjacent to itself.
    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        self.neighbours[u].binary_search(&v).is_ok()
    }
}
