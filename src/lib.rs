// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Embedding search for bigraphs.
//!
//! Given a pattern bigraph and a target bigraph, find an injective map from
//! pattern vertices to target vertices that preserves labels, the place forest
//! and the link hypergraph (and, when induced, their absence too), or count all
//! such maps.
//!
//! # Architecture
//!
//! The implementation uses a two-tier memory model:
//!
//! ## Tier 1: MEMO Data (Immutable)
//!
//! Precomputed once per solve and shared by every worker:
//! - Adjacency bit graphs and supplemental graphs for both bigraphs
//! - Ancestor and descendant sets of the target
//! - The symmetry-breaking constraints and the set of branching variables
//!
//! ## Tier 2: DYNAMIC Data (Mutable)
//!
//! Owned by each worker and tracked on its trail:
//! - Domain store: one candidate bitset per pattern vertex
//! - Nogoods learnt at restarts
//! - Statistics counters
//!
//! # Search Algorithm
//!
//! 1. **Root filtering**: compatibility, degrees, neighbourhood degree
//!    sequences and clique bounds prune every domain before branching
//! 2. **Branching**: fail-first variable choice, heuristic value order
//! 3. **Propagation**: each assignment is pushed through the structural rules,
//!    all-different and nogoods, with singleton domains assigned at once
//! 4. **Restarts**: a schedule bounds each run; nogoods keep the search complete
//!
//! # Parallelization
//!
//! Counting splits the first branching variable's values across workers.
//! Finding runs independent workers that race for the first solution,
//! optionally restarting together.

pub mod bigraph;
pub mod config;
pub mod context;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod memo;
pub mod oracle;
pub mod parallel;
pub mod propagation;
pub mod restarts;
pub mod solver;
pub mod state;
pub mod symmetry;
pub mod timeout;
pub mod trail;

// Re-export commonly used types
pub use bigraph::{Bigraph, BigraphBuilder, BigraphDocument};
pub use config::{RestartPolicy, RuleToggles, SolverParams, ValueOrdering};
pub use context::SearchContext;
pub use engine::{SearchEngine, SolutionSink};
pub use errors::SolveError;
pub use oracle::{MatchOracle, NamedPipeOracle, OracleVerdict};
pub use solver::{solve, solve_with_timeout, SolveHooks, SolveResult};
pub use symmetry::{EnumeratedSymmetries, PatternSymmetries, SymmetryOracle};
pub use timeout::Timeout;
pub use trail::Trail;
