// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! JSON documents describing a bigraph, as read by the command line tool.
//!
//! ```json
//! {
//!   "vertices": [
//!     { "name": "r", "label": "Room", "arity": 0 },
//!     { "name": "a", "label": "Agent", "arity": 1, "parent": "r" }
//!   ],
//!   "links": [ { "name": "e", "ports": [ { "vertex": "a", "port": 0 } ] } ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::{Bigraph, BigraphBuilder};
use crate::errors::SolveError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexDocument {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub arity: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDocument {
    pub vertex: String,
    pub port: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub ports: Vec<PortDocument>,
}

/// Serialized form of a [`Bigraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigraphDocument {
    pub vertices: Vec<VertexDocument>,
    #[serde(default)]
    pub links: Vec<LinkDocument>,
}

impl BigraphDocument {
    /// Parse JSON text into a validated bigraph.
    pub fn parse(json: &str, role: &str) -> Result<Bigraph, SolveError> {
        let doc: BigraphDocument = serde_json::from_str(json)
            .map_err(|e| SolveError::malformed(role, format!("invalid JSON: {}", e)))?;
        doc.into_bigraph(role)
    }

    /// Resolve vertex names and build.
    pub fn into_bigraph(self, role: &str) -> Result<Bigraph, SolveError> {
        let mut builder = BigraphBuilder::new(role);
        for vertex in &self.vertices {
            builder.add_vertex(&vertex.name, &vertex.label, vertex.arity);
        }
        let index_of = |name: &str| -> Result<usize, SolveError> {
            self.vertices
                .iter()
                .position(|v| v.name == name)
                .ok_or_else(|| SolveError::malformed(role, format!("unknown vertex '{}'", name)))
        };

        for (v, vertex) in self.vertices.iter().enumerate() {
            if let Some(parent) = &vertex.parent {
                builder.set_parent(v, index_of(parent)?);
            }
        }
        for link in &self.links {
            let ports = link
                .ports
                .iter()
                .map(|p| -> Result<(usize, usize), SolveError> { Ok((index_of(&p.vertex)?, p.port)) })
                .collect::<Result<Vec<_>, _>>()?;
            builder.add_link(&ports);
        }
        builder.build()
    }

    /// Inverse of [`into_bigraph`](Self::into_bigraph), listing every link including singletons.
    pub fn from_bigraph(graph: &Bigraph) -> Self {
        let vertices = (0..graph.len())
            .map(|v| VertexDocument {
                name: graph.name(v).to_string(),
                label: graph.label(v).to_string(),
                arity: graph.arity(v),
                parent: graph.parent(v).map(|p| graph.name(p).to_string()),
            })
            .collect();
        let links = (0..graph.links().link_count())
            .map(|l| LinkDocument {
                name: None,
                ports: graph
                    .links()
                    .ports(l)
                    .iter()
                    .map(|p| PortDocument {
                        vertex: graph.name(p.vertex).to_string(),
                        port: p.index,
                    })
                    .collect(),
            })
            .collect();
        Self { vertices, links }
    }
}
