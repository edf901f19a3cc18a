// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! External acceptance of complete mappings.
//!
//! A [`MatchOracle`] sees each structurally valid complete mapping before it is
//! accepted. A rejection is a normal search failure; an error aborts the solve.

pub mod pipe;

pub use pipe::NamedPipeOracle;

use crate::errors::SolveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleVerdict {
    Accept,
    Reject,
}

/// Capability injected into the engine; shared by every worker thread.
pub trait MatchOracle: Send + Sync {
    /// Judge a complete mapping, given as `(pattern vertex, target vertex)` pairs
    /// in pattern order.
    fn ask(&self, mapping: &[(usize, usize)]) -> Result<OracleVerdict, SolveError>;
}

impl<F> MatchOracle for F
where
    F: Fn(&[(usize, usize)]) -> Result<OracleVerdict, SolveError> + Send + Sync,
{
    fn ask(&self, mapping: &[(usize, usize)]) -> Result<OracleVerdict, SolveError> {
        self(mapping)
    }
}
