// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Running one or more workers over the same propagated root.
//!
//! - One thread: a single [`SearchEngine`] runs to completion.
//! - Counting with several threads: the values of the first branching variable
//!   are handed out through a shared cursor, one subtree at a time, so the
//!   per-worker counts add up to the total.
//! - Finding with several threads: every worker searches the whole tree with
//!   its own seed and restart schedule, and the first solution claimed wins.
//!   With triggered restarts, worker 0 leads and the others restart when it
//!   does; with delayed thread creation, the others start after its first
//!   restart (or when it finishes).
//!
//! Workers run under [`std::thread::scope`], so they borrow the MEMO data and
//! the root directly.

pub mod control;

pub use control::SearchControl;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tracing::{debug, info};

use crate::config::{RestartPolicy, SolverParams, ValueOrdering};
use crate::context::SearchContext;
use crate::engine::{
    choose_variable, splitmix64, SearchEngine, Termination, ValueOrderer, WorkerOutcome, WorkerRole,
};
use crate::errors::SolveError;
use crate::memo::MemoizedData;
use crate::propagation;
use crate::restarts::RestartTracker;
use crate::solver::SolveHooks;
use crate::state::Statistics;

/// Combined result of all workers.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub mapping: Option<Vec<(usize, usize)>>,
    pub solution_count: u64,
    pub statistics: Statistics,
    /// The search space was fully explored, or the wanted solution found.
    pub complete: bool,
    pub threads: usize,
    pub nogoods: usize,
}

impl Aggregate {
    fn absorb(&mut self, outcome: WorkerOutcome) {
        self.statistics.merge(&outcome.statistics);
        self.solution_count += outcome.solution_count;
        self.nogoods += outcome.nogoods;
        if outcome.mapping.is_some() {
            self.mapping = outcome.mapping;
        }
    }
}

/// Everything a worker needs, shared by reference.
#[derive(Clone, Copy)]
struct Shared<'s, 'a> {
    memo: &'a MemoizedData,
    params: &'s SolverParams,
    restarts: &'s RestartPolicy,
    counting: bool,
    control: &'s SearchControl,
    hooks: &'s SolveHooks<'s>,
}

impl<'s, 'a> Shared<'s, 'a> {
    fn engine(&self, root: &SearchContext<'a>, worker: usize, role: WorkerRole) -> SearchEngine<'a> {
        let seed = splitmix64(self.params.seed ^ worker as u64);
        let ordering = match self.params.value_ordering {
            // helpers need some randomness to diverge from worker 0
            ValueOrdering::Degree | ValueOrdering::AntiDegree if worker > 0 && !self.counting => {
                ValueOrdering::Biased
            }
            ordering => ordering,
        };
        let schedule = match role {
            WorkerRole::Follower => RestartPolicy::NoRestarts.build(),
            WorkerRole::Solo | WorkerRole::Leader => self.restarts.build(),
        };
        SearchEngine::new(
            root.fork(),
            ValueOrderer::new(ordering, seed, self.memo.target_len()),
            RestartTracker::new(schedule),
            role,
            self.counting,
        )
    }
}

/// Root propagation, then the search with the configured number of workers.
pub fn run(
    memo: &MemoizedData,
    params: &SolverParams,
    restarts: &RestartPolicy,
    counting: bool,
    control: &SearchControl,
    hooks: &SolveHooks<'_>,
) -> Result<Aggregate, SolveError> {
    let threads = params.threads();
    let mut root = match SearchContext::new(memo) {
        Ok(root) => root,
        Err(failure) => {
            info!(%failure, "root filtering leaves no candidates");
            let mut statistics = Statistics::new();
            statistics.record_failure(&failure);
            return Ok(unsatisfiable(statistics, threads));
        }
    };
    if let Err(failure) = propagation::propagate_root(&mut root) {
        info!(%failure, "root propagation fails");
        root.statistics.record_failure(&failure);
        return Ok(unsatisfiable(root.statistics, threads));
    }
    root.store.freeze();

    let shared = Shared {
        memo,
        params,
        restarts,
        counting,
        control,
        hooks,
    };
    let mut aggregate = if threads <= 1 {
        solo(shared, &root)?
    } else if counting {
        partitioned(shared, &root, threads)?
    } else {
        race(shared, &root, threads)?
    };
    aggregate.statistics.merge(&root.statistics);
    aggregate.threads = threads;
    Ok(aggregate)
}

fn unsatisfiable(statistics: Statistics, threads: usize) -> Aggregate {
    Aggregate {
        statistics,
        complete: true,
        threads,
        ..Aggregate::default()
    }
}

fn solo<'a>(shared: Shared<'_, 'a>, root: &SearchContext<'a>) -> Result<Aggregate, SolveError> {
    let mut engine = shared.engine(root, 0, WorkerRole::Solo);
    let termination = engine.run(shared.control, shared.hooks)?;
    let mut aggregate = Aggregate {
        complete: termination.is_complete(),
        ..Aggregate::default()
    };
    aggregate.absorb(engine.into_outcome(termination));
    Ok(aggregate)
}

fn partitioned<'a>(shared: Shared<'_, 'a>, root: &SearchContext<'a>, threads: usize) -> Result<Aggregate, SolveError> {
    let Some(var) = choose_variable(shared.memo, &root.store) else {
        // propagation alone assigned everything
        return solo(shared, root);
    };
    let values: Vec<usize> = root.store.iter(var).collect();
    debug!(var, subtrees = values.len(), threads, "partitioning root");
    let cursor = AtomicUsize::new(0);
    let (values, cursor) = (&values, &cursor);

    let results: Vec<Result<WorkerOutcome, SolveError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(move |worker| {
                s.spawn(move || {
                    let mut engine = shared.engine(root, worker, WorkerRole::Solo);
                    let mut termination = Termination::Exhausted;
                    loop {
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(&value) = values.get(i) else { break };
                        termination = engine
                            .run_subtree(var, value, shared.control, shared.hooks)
                            .inspect_err(|_| shared.control.stop())?;
                        if termination != Termination::Exhausted {
                            break;
                        }
                    }
                    Ok(engine.into_outcome(termination))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut aggregate = Aggregate {
        complete: true,
        ..Aggregate::default()
    };
    for result in results {
        let outcome = result?;
        aggregate.complete &= outcome.termination == Termination::Exhausted;
        aggregate.absorb(outcome);
    }
    Ok(aggregate)
}

fn race<'a>(shared: Shared<'_, 'a>, root: &SearchContext<'a>, threads: usize) -> Result<Aggregate, SolveError> {
    let triggered = shared.params.triggered_restarts;
    let delayed = shared.params.delay_thread_creation;
    let (tx, rx) = crossbeam::channel::bounded::<()>(1);

    let results: Vec<Result<WorkerOutcome, SolveError>> = thread::scope(|s| {
        let spawn = move |worker: usize, signal: Option<crossbeam::channel::Sender<()>>| {
            let role = match (triggered, worker) {
                (false, _) => WorkerRole::Solo,
                (true, 0) => WorkerRole::Leader,
                (true, _) => WorkerRole::Follower,
            };
            s.spawn(move || {
                let mut engine = shared.engine(root, worker, role);
                if let Some(tx) = signal {
                    engine = engine.with_first_restart_signal(tx);
                }
                let termination = engine
                    .run(shared.control, shared.hooks)
                    .inspect_err(|_| shared.control.stop())?;
                if termination.is_complete() {
                    shared.control.stop();
                }
                debug!(worker, ?termination, "worker finished");
                Ok(engine.into_outcome(termination))
            })
        };

        let mut handles = Vec::with_capacity(threads);
        if delayed {
            handles.push(spawn(0, Some(tx)));
            // a message or a disconnect: either way worker 0 has restarted or ended
            let _ = rx.recv();
            debug!("starting helper workers");
        } else {
            drop(tx);
            handles.push(spawn(0, None));
        }
        if !shared.control.stopped() {
            handles.extend((1..threads).map(|worker| spawn(worker, None)));
        }
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut aggregate = Aggregate::default();
    for result in results {
        let outcome = result?;
        aggregate.complete |= outcome.termination.is_complete();
        aggregate.absorb(outcome);
    }
    Ok(aggregate)
}
