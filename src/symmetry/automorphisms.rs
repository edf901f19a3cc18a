// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Symmetry breaking from enumerated automorphisms.
//!
//! The automorphisms of the pattern are its induced embeddings into itself, so
//! they are found with the solver. A stabilizer chain then turns the group into
//! `v < w` constraints: take the lowest vertex `v` moved by the current group,
//! require `v` to precede every other vertex of its orbit, and continue with the
//! subgroup fixing `v`.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use super::{PatternSymmetries, SymmetryOracle};
use crate::bigraph::Bigraph;
use crate::config::{RestartPolicy, SolverParams, ValueOrdering};
use crate::errors::SolveError;
use crate::solver::{self, SolveHooks};

/// Enumerates up to `max_automorphisms` automorphisms; larger groups yield no
/// constraints.
#[derive(Debug, Clone, Copy)]
pub struct EnumeratedSymmetries {
    pub max_automorphisms: usize,
}

impl Default for EnumeratedSymmetries {
    fn default() -> Self {
        Self {
            max_automorphisms: 10_000,
        }
    }
}

impl SymmetryOracle for EnumeratedSymmetries {
    fn pattern_symmetries(&self, pattern: &Bigraph) -> Result<PatternSymmetries, SolveError> {
        let params = SolverParams {
            induced: true,
            count_solutions: true,
            restarts: Some(RestartPolicy::NoRestarts),
            value_ordering: ValueOrdering::Degree,
            n_threads: 1,
            ..SolverParams::default()
        };
        let found = Mutex::new(Vec::new());
        let overflow = AtomicBool::new(false);
        let collect = |mapping: &[(usize, usize)]| {
            let Ok(mut found) = found.lock() else { return false };
            if found.len() >= self.max_automorphisms {
                overflow.store(true, Ordering::Relaxed);
                return false;
            }
            found.push(mapping.iter().map(|&(_, t)| t).collect::<Vec<usize>>());
            true
        };
        let hooks = SolveHooks {
            sink: Some(&collect),
            ..SolveHooks::default()
        };
        solver::solve(pattern, pattern, &params, &hooks)?;

        if overflow.load(Ordering::Relaxed) {
            warn!(
                limit = self.max_automorphisms,
                "pattern has too many automorphisms, no symmetry breaking"
            );
            return Ok(PatternSymmetries::default());
        }
        let group = found
            .into_inner()
            .map_err(|_| SolveError::constraint("automorphisms", "collector poisoned"))?;
        debug!(automorphisms = group.len(), "pattern automorphisms enumerated");
        Ok(stabilizer_chain(pattern.len(), group))
    }
}

/// Constraints from a stabilizer chain of `group` (permutations of `0..n`, as
/// image vectors).
pub fn stabilizer_chain(n: usize, mut group: Vec<Vec<usize>>) -> PatternSymmetries {
    let group_size = (!group.is_empty()).then(|| group.len().to_string());
    let mut less_than = Vec::new();
    for v in 0..n {
        if group.len() <= 1 {
            break;
        }
        let orbit: BTreeSet<usize> = group.iter().map(|g| g[v]).collect();
        less_than.extend(orbit.into_iter().filter(|&w| w != v).map(|w| (v, w)));
        group.retain(|g| g[v] == v);
    }
    PatternSymmetries { less_than, group_size }
}
