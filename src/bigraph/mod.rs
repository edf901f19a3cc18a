// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Immutable bigraph model shared by the pattern and the target.
//!
//! A [`Bigraph`] bundles a [`PlaceForest`] (nesting) with a [`LinkHypergraph`]
//! (port connectivity) and per-vertex names, labels and arities. It is validated
//! once by [`BigraphBuilder::build`] and never mutated afterwards, so every worker
//! thread reads it through a shared reference.
//!
//! # Example
//!
//! ```
//! use bigraph_match::bigraph::BigraphBuilder;
//!
//! let mut b = BigraphBuilder::new("pattern");
//! let room = b.add_vertex("room", "Room", 0);
//! let agent = b.add_vertex("agent", "Agent", 1);
//! b.set_parent(agent, room);
//! let graph = b.build().unwrap();
//!
//! assert!(graph.is_ancestor(room, agent));
//! assert_eq!(graph.vertex_by_name("agent"), Some(agent));
//! ```

pub mod document;
pub mod link;
pub mod place;

pub use document::BigraphDocument;
pub use link::{LinkHypergraph, Port};
pub use place::PlaceForest;

use std::collections::HashMap;

use crate::errors::SolveError;

/// A validated pattern or target bigraph.
#[derive(Debug, Clone)]
pub struct Bigraph {
    role: String,
    names: Vec<String>,
    labels: Vec<String>,
    arities: Vec<usize>,
    place: PlaceForest,
    links: LinkHypergraph,
    by_name: HashMap<String, usize>,
}

impl Bigraph {
    /// Vertex count.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// "pattern", "target", or whatever the builder was given; used in diagnostics.
    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn name(&self, v: usize) -> &str {
        &self.names[v]
    }

    pub fn label(&self, v: usize) -> &str {
        &self.labels[v]
    }

    /// Number of ports on `v`.
    pub fn arity(&self, v: usize) -> usize {
        self.arities[v]
    }

    /// Number of distinct vertices sharing a link with `v`.
    pub fn degree(&self, v: usize) -> usize {
        self.links.neighbours(v).len()
    }

    pub fn parent(&self, v: usize) -> Option<usize> {
        self.place.parent(v)
    }

    pub fn children(&self, v: usize) -> &[usize] {
        self.place.children(v)
    }

    pub fn place(&self) -> &PlaceForest {
        &self.place
    }

    pub fn links(&self) -> &LinkHypergraph {
        &self.links
    }

    /// Links incident to `v`, indexed by port number.
    pub fn incident_links(&self, v: usize) -> &[usize] {
        self.links.port_links(v)
    }

    /// True when `a` is a strict ancestor of `d` in the place forest.
    #[inline]
    pub fn is_ancestor(&self, a: usize, d: usize) -> bool {
        self.place.is_ancestor(a, d)
    }

    /// True when `u` and `v` are distinct and share a link.
    #[inline]
    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        self.links.adjacent(u, v)
    }

    pub fn vertex_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

/// Incremental construction of a [`Bigraph`]; all validation happens in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct BigraphBuilder {
    role: String,
    names: Vec<String>,
    labels: Vec<String>,
    arities: Vec<usize>,
    /// `(child, parent)` in call order; checked by `build`.
    nestings: Vec<(usize, usize)>,
    links: Vec<Vec<Port>>,
}

impl BigraphBuilder {
    pub fn new(role: &str) -> Self {
        Self {
            role: role.to_string(),
            names: Vec::new(),
            labels: Vec::new(),
            arities: Vec::new(),
            nestings: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Add a root vertex and return its index.
    pub fn add_vertex(&mut self, name: &str, label: &str, arity: usize) -> usize {
        self.names.push(name.to_string());
        self.labels.push(label.to_string());
        self.arities.push(arity);
        self.names.len() - 1
    }

    /// Nest `child` directly inside `parent`. A later call for the same child wins.
    pub fn set_parent(&mut self, child: usize, parent: usize) {
        self.nestings.push((child, parent));
    }

    /// Add a link joining the given `(vertex, port)` pairs and return its index.
    pub fn add_link(&mut self, ports: &[(usize, usize)]) -> usize {
        self.links
            .push(ports.iter().map(|&(vertex, index)| Port::new(vertex, index)).collect());
        self.links.len() - 1
    }

    /// Validate and freeze.
    ///
    /// Fails with [`SolveError::MalformedBigraph`] on duplicate vertex names, a
    /// cyclic or out-of-range parent relation, or ports that are out of range or
    /// claimed by more than one link.
    pub fn build(self) -> Result<Bigraph, SolveError> {
        let mut by_name = HashMap::with_capacity(self.names.len());
        for (v, name) in self.names.iter().enumerate() {
            if by_name.insert(name.clone(), v).is_some() {
                return Err(SolveError::malformed(
                    &self.role,
                    format!("vertex name '{}' is used more than once", name),
                ));
            }
        }

        let mut parents = vec![None; self.names.len()];
        for &(child, parent) in &self.nestings {
            let Some(slot) = parents.get_mut(child) else {
                return Err(SolveError::malformed(
                    &self.role,
                    format!("child {} of {} is not a vertex", child, parent),
                ));
            };
            *slot = Some(parent);
        }
        let place = PlaceForest::new(parents).map_err(|reason| SolveError::malformed(&self.role, reason))?;
        let links = LinkHypergraph::new(&self.arities, self.links)
            .map_err(|reason| SolveError::malformed(&self.role, reason))?;

        Ok(Bigraph {
            role: self.role,
            names: self.names,
            labels: self.labels,
            arities: self.arities,
            place,
            links,
            by_name,
        })
    }
}
