// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Local failures of constraint propagation.
//!
//! These are ordinary control flow for the search (the engine backtracks) and are
//! never shown to callers, except as per-kind counts in the statistics.

use std::fmt;

use strum_macros::{EnumCount as EnumCountMacro, EnumDiscriminants, EnumIter, IntoStaticStr};

/// Why propagation gave up on the current node.
#[derive(Debug, Clone, PartialEq, Eq, EnumCountMacro, EnumDiscriminants)]
#[strum_discriminants(name(FailureKind))]
#[strum_discriminants(derive(EnumIter, IntoStaticStr))]
pub enum PropagationFailure {
    /// Root filtering (labels, arity, degrees, place counts, cliques) left no candidate.
    Compatibility { var: usize },

    /// The only remaining candidate is already the image of another vertex.
    Injectivity { var: usize, value: usize },

    /// No candidate keeps the required ancestor/descendant relation.
    Ancestry { var: usize },

    /// No candidate has its ports on the links the pattern demands.
    Link { var: usize },

    /// A supplemental graph edge has no image.
    Supplemental { var: usize, graph: &'static str },

    /// A symmetry-breaking `v<w` constraint cannot be satisfied.
    LessThan { var: usize },

    /// More unassigned vertices than candidates between them.
    AllDifferent { vars: usize, values: usize },

    /// Every literal of a recorded nogood holds.
    Nogood { literals: usize },
}

impl PropagationFailure {
    pub fn kind(&self) -> FailureKind {
        FailureKind::from(self)
    }
}

impl FailureKind {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for PropagationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationFailure::Compatibility { var } => {
                write!(f, "Pattern vertex {} has no compatible target vertex", var)
            }
            PropagationFailure::Injectivity { var, value } => {
                write!(f, "Pattern vertex {} needs target {} which is already used", var, value)
            }
            PropagationFailure::Ancestry { var } => {
                write!(f, "Pattern vertex {} cannot preserve ancestry", var)
            }
            PropagationFailure::Link { var } => {
                write!(f, "Pattern vertex {} cannot preserve its links", var)
            }
            PropagationFailure::Supplemental { var, graph } => {
                write!(f, "Pattern vertex {} has no image in supplemental graph {}", var, graph)
            }
            PropagationFailure::LessThan { var } => {
                write!(f, "Pattern vertex {} violates a symmetry-breaking constraint", var)
            }
            PropagationFailure::AllDifferent { vars, values } => {
                write!(f, "{} pattern vertices share only {} target vertices", vars, values)
            }
            PropagationFailure::Nogood { literals } => {
                write!(f, "Nogood of {} literals is violated", literals)
            }
        }
    }
}
