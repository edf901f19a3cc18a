// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Errors surfaced to callers of the solver.
//!
//! Everything here is fatal for a solve: it is detected either before the search
//! starts (malformed input, bad constraints, unknown policy names) or while talking
//! to an external oracle. Local search failures are not errors; see
//! [`crate::propagation::PropagationFailure`].

use std::io;

use thiserror::Error;

/// Fatal errors reported by [`crate::solve`] and the input builders.
#[derive(Debug, Error)]
pub enum SolveError {
    /// Place forest or link hypergraph violates its structural invariants.
    #[error("malformed bigraph {graph}: {reason}")]
    MalformedBigraph { graph: String, reason: String },

    /// A symmetry-breaking constraint could not be parsed or names an unknown vertex.
    #[error("invalid pattern constraint '{constraint}': {reason}")]
    ConstraintSyntax { constraint: String, reason: String },

    /// The external oracle could not be reached or answered with something unreadable.
    #[error("oracle communication failed: {reason}")]
    OracleCommunication {
        reason: String,
        #[source]
        source: Option<io::Error>,
    },

    /// Unrecognised restart policy or value-ordering heuristic name.
    #[error("unknown {kind} '{name}'")]
    UnknownPolicy { kind: &'static str, name: String },
}

impl SolveError {
    pub(crate) fn malformed(graph: &str, reason: impl Into<String>) -> Self {
        SolveError::MalformedBigraph {
            graph: graph.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn constraint(constraint: &str, reason: impl Into<String>) -> Self {
        SolveError::ConstraintSyntax {
            constraint: constraint.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn oracle(reason: impl Into<String>, source: Option<io::Error>) -> Self {
        SolveError::OracleCommunication {
            reason: reason.into(),
            source,
        }
    }
}
