// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The `solve` entry point.
//!
//! A solve resolves symmetry constraints, precomputes the MEMO data, runs the
//! workers and folds their outcomes into one [`SolveResult`]. Nothing is kept
//! between solves.

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::bigraph::Bigraph;
use crate::config::SolverParams;
use crate::engine::SolutionSink;
use crate::errors::SolveError;
use crate::memo::MemoizedData;
use crate::oracle::MatchOracle;
use crate::parallel::{self, SearchControl};
use crate::state::Counters;
use crate::symmetry::{self, SymmetryOracle};
use crate::timeout::Timeout;

/// Optional capabilities supplied by the caller.
///
/// A `sink` turns on enumeration, which implies counting.
#[derive(Default, Clone, Copy)]
pub struct SolveHooks<'h> {
    pub sink: Option<&'h dyn SolutionSink>,
    pub oracle: Option<&'h dyn MatchOracle>,
    pub symmetry: Option<&'h dyn SymmetryOracle>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SolveResult {
    /// Whether an embedding exists (as far as the search got).
    pub found: bool,
    /// `(pattern vertex, target vertex)` pairs in pattern order; empty when
    /// counting or when nothing was found.
    pub mapping: Vec<(usize, usize)>,
    pub solution_count: u64,
    pub nodes: u64,
    pub propagations: u64,
    /// `name = value` lines.
    pub extra_stats: Vec<String>,
    /// The timeout fired before the search could finish.
    pub aborted: bool,
}

/// Solve with the timeout from `params`.
pub fn solve(
    pattern: &Bigraph,
    target: &Bigraph,
    params: &SolverParams,
    hooks: &SolveHooks<'_>,
) -> Result<SolveResult, SolveError> {
    solve_with_timeout(pattern, target, params, hooks, Timeout::new(params.timeout))
}

/// Solve under an explicit [`Timeout`], ignoring `params.timeout`.
pub fn solve_with_timeout(
    pattern: &Bigraph,
    target: &Bigraph,
    params: &SolverParams,
    hooks: &SolveHooks<'_>,
    timeout: Timeout,
) -> Result<SolveResult, SolveError> {
    let started = Instant::now();
    let counting = params.count_solutions || hooks.sink.is_some();
    let restarts = params.effective_restarts(counting);
    let symmetries = symmetry::resolve(params, pattern, hooks.symmetry)?;

    info!(
        pattern = pattern.len(),
        target = target.len(),
        induced = params.induced,
        counting,
        restarts = restarts.name(),
        ordering = %params.value_ordering,
        threads = params.threads(),
        "solve started"
    );

    // an oracle must be offered every placement, not one per leaf
    let every_embedding = counting || hooks.oracle.is_some();
    let memo = MemoizedData::new(pattern, target, params, symmetries.less_than.clone(), every_embedding);
    let control = SearchControl::new(timeout);
    let aggregate = parallel::run(&memo, params, &restarts, counting, &control, hooks)?;

    let stats = &aggregate.statistics;
    let mut extra_stats = vec![
        format!("restarts = {}", stats.get(Counters::Restarts)),
        format!("backtracks = {}", stats.get(Counters::Backtracks)),
        format!("nogoods = {}", aggregate.nogoods),
        format!("threads = {}", aggregate.threads),
    ];
    for (kind, n) in stats.failure_counts() {
        extra_stats.push(format!("failures.{} = {}", kind, n));
    }
    for counter in [Counters::OracleRejections, Counters::ValidationFailures] {
        let n = stats.get(counter);
        if n > 0 {
            extra_stats.push(format!("{} = {}", <&'static str>::from(counter), n));
        }
    }
    if !symmetries.less_than.is_empty() {
        extra_stats.push(format!("symmetry_constraints = {}", symmetries.less_than.len()));
    }
    if let Some(size) = &symmetries.group_size {
        extra_stats.push(format!("automorphism_group_size = {}", size));
        if counting {
            if let Some(total) = symmetry::unbroken_count(aggregate.solution_count, size) {
                extra_stats.push(format!("symmetry_adjusted_count = {}", total));
            }
        }
    }

    let aborted = control.timeout().aborted() && !aggregate.complete;
    let found = if counting {
        aggregate.solution_count > 0
    } else {
        aggregate.mapping.is_some()
    };
    let result = SolveResult {
        found,
        mapping: aggregate.mapping.unwrap_or_default(),
        solution_count: aggregate.solution_count,
        nodes: stats.get(Counters::Nodes),
        propagations: stats.get(Counters::Propagations),
        extra_stats,
        aborted,
    };
    info!(
        found = result.found,
        solutions = result.solution_count,
        nodes = result.nodes,
        aborted = result.aborted,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "solve finished"
    );
    Ok(result)
}
