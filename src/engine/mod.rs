// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Backtracking search engine.
//!
//! One engine is one worker. It owns a [`SearchContext`] whose store was frozen
//! at the propagated root, and explores it depth first with an explicit stack of
//! [`Frame`]s. Each frame records the branching variable, its ordered candidate
//! values, the next value to try, and the trail checkpoint taken before any of
//! them was assigned.
//!
//! # State machine
//!
//! ```text
//! SelectVariable --none left--> Solution --counting--> SelectValue
//!      |    \                       \--finding--> Done(Found)
//!      |     \--restart due--> Restart --> SelectVariable
//!      v
//! SelectValue --value--> Propagate --ok--> SelectVariable
//!      |                     \--failed--> SelectValue
//!      \--exhausted--> Backtrack --> SelectValue | Done(Exhausted)
//! ```
//!
//! The timeout, the shared stop flag and the restart budget are all checked on
//! entering `SelectVariable`, which is also where nodes are counted.

pub mod ordering;
pub mod solution;

pub use ordering::{choose_variable, splitmix64, ValueOrderer};
pub use solution::{place_unassigned, verify_mapping, SolutionSink};

use crossbeam::channel::Sender;
use tracing::{error, trace};

use crate::context::SearchContext;
use crate::errors::SolveError;
use crate::oracle::OracleVerdict;
use crate::parallel::control::SearchControl;
use crate::propagation;
use crate::restarts::RestartTracker;
use crate::solver::SolveHooks;
use crate::state::{Counters, Statistics};

/// How a worker takes part in restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerRole {
    /// Restarts on its own schedule.
    Solo,
    /// Restarts on its own schedule and tells followers.
    Leader,
    /// Restarts only when the leader does.
    Follower,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The whole (sub)tree was explored.
    Exhausted,
    /// This worker found the reported solution.
    Found,
    /// Another worker finished the job, or the sink asked to stop.
    Stopped,
    /// The timeout fired.
    Aborted,
}

impl Termination {
    pub fn is_complete(self) -> bool {
        matches!(self, Termination::Exhausted | Termination::Found)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SelectVariable,
    SelectValue,
    Propagate { var: usize, value: usize },
    Backtrack,
    Solution,
    Restart,
    Done(Termination),
}

#[derive(Debug)]
struct Frame {
    var: usize,
    values: Vec<usize>,
    next: usize,
    checkpoint: usize,
}

/// What a worker hands back to the coordinator.
#[derive(Debug)]
pub struct WorkerOutcome {
    pub mapping: Option<Vec<(usize, usize)>>,
    pub solution_count: u64,
    pub statistics: Statistics,
    pub termination: Termination,
    pub nogoods: usize,
}

pub struct SearchEngine<'a> {
    ctx: SearchContext<'a>,
    orderer: ValueOrderer,
    restarts: RestartTracker,
    role: WorkerRole,
    /// Restarts on its own budget; false for followers and `NoRestarts`.
    self_restarting: bool,
    counting: bool,
    frames: Vec<Frame>,
    root_mark: usize,
    seen_generation: u64,
    first_restart: Option<Sender<()>>,
    solution_count: u64,
    mapping: Option<Vec<(usize, usize)>>,
}

impl<'a> SearchEngine<'a> {
    /// `ctx` must hold the propagated root, frozen.
    pub fn new(
        ctx: SearchContext<'a>,
        orderer: ValueOrderer,
        restarts: RestartTracker,
        role: WorkerRole,
        counting: bool,
    ) -> Self {
        let root_mark = ctx.store.mark();
        let self_restarting = role != WorkerRole::Follower && restarts.might_restart();
        Self {
            ctx,
            orderer,
            restarts,
            role,
            self_restarting,
            counting,
            frames: Vec::new(),
            root_mark,
            seen_generation: 0,
            first_restart: None,
            solution_count: 0,
            mapping: None,
        }
    }

    /// Signal `tx` once, at this worker's first restart (or when it is dropped).
    pub fn with_first_restart_signal(mut self, tx: Sender<()>) -> Self {
        self.first_restart = Some(tx);
        self
    }

    pub fn statistics(&self) -> &Statistics {
        &self.ctx.statistics
    }

    pub fn solution_count(&self) -> u64 {
        self.solution_count
    }

    /// Search the whole tree below the root.
    pub fn run(&mut self, control: &SearchControl, hooks: &SolveHooks<'_>) -> Result<Termination, SolveError> {
        self.frames.clear();
        self.ctx.store.undo_to(self.root_mark);
        let termination = self.search(control, hooks);
        self.frames.clear();
        termination
    }

    /// Search the subtree where `var = value`. Used to split counting work.
    pub fn run_subtree(
        &mut self,
        var: usize,
        value: usize,
        control: &SearchControl,
        hooks: &SolveHooks<'_>,
    ) -> Result<Termination, SolveError> {
        self.frames.clear();
        self.ctx.store.undo_to(self.root_mark);
        let termination = match propagation::assign_and_propagate(&mut self.ctx, var, value) {
            Ok(_) => self.search(control, hooks),
            Err(failure) => {
                trace!(var, value, %failure, "subtree root fails");
                self.ctx.statistics.record_failure(&failure);
                Ok(Termination::Exhausted)
            }
        };
        self.frames.clear();
        self.ctx.store.undo_to(self.root_mark);
        termination
    }

    pub fn into_outcome(self, termination: Termination) -> WorkerOutcome {
        WorkerOutcome {
            mapping: self.mapping,
            solution_count: self.solution_count,
            statistics: self.ctx.statistics,
            termination,
            nogoods: self.ctx.nogoods.len(),
        }
    }

    fn search(&mut self, control: &SearchControl, hooks: &SolveHooks<'_>) -> Result<Termination, SolveError> {
        let mut state = State::SelectVariable;
        loop {
            state = match state {
                State::SelectVariable => self.select_variable(control),
                State::SelectValue => self.select_value(),
                State::Propagate { var, value } => self.propagate(var, value),
                State::Backtrack => self.backtrack(),
                State::Solution => self.solution(control, hooks)?,
                State::Restart => self.restart(control),
                State::Done(termination) => return Ok(termination),
            };
        }
    }

    fn select_variable(&mut self, control: &SearchControl) -> State {
        self.ctx.statistics.increment(Counters::Nodes);
        if control.timeout().check() {
            return State::Done(Termination::Aborted);
        }
        if control.stopped() {
            return State::Done(Termination::Stopped);
        }
        if self.role == WorkerRole::Follower && control.restart_generation() != self.seen_generation {
            return State::Restart;
        }
        if self.self_restarting && !self.frames.is_empty() && self.restarts.should_restart() {
            return State::Restart;
        }

        match choose_variable(self.ctx.memo, &self.ctx.store) {
            None => State::Solution,
            Some(var) => {
                let mut values: Vec<usize> = self.ctx.store.iter(var).collect();
                self.orderer.order(self.ctx.memo, &mut values);
                self.frames.push(Frame {
                    var,
                    values,
                    next: 0,
                    checkpoint: self.ctx.store.mark(),
                });
                State::SelectValue
            }
        }
    }

    fn select_value(&mut self) -> State {
        let Some(frame) = self.frames.last_mut() else {
            return State::Done(Termination::Exhausted);
        };
        self.ctx.store.undo_to(frame.checkpoint);
        while frame.next < frame.values.len() {
            let value = frame.values[frame.next];
            frame.next += 1;
            // earlier siblings may have pruned it through nogoods
            if self.ctx.store.contains(frame.var, value) {
                return State::Propagate { var: frame.var, value };
            }
        }
        State::Backtrack
    }

    fn propagate(&mut self, var: usize, value: usize) -> State {
        match propagation::assign_and_propagate(&mut self.ctx, var, value) {
            Ok(_) => State::SelectVariable,
            Err(failure) => {
                self.ctx.statistics.record_failure(&failure);
                State::SelectValue
            }
        }
    }

    fn backtrack(&mut self) -> State {
        self.frames.pop();
        self.ctx.statistics.increment(Counters::Backtracks);
        if self.self_restarting {
            self.restarts.did_backtrack();
        }
        self.resume()
    }

    /// Continue with the next sibling, if there is a frame left to take it from.
    fn resume(&self) -> State {
        if self.frames.is_empty() {
            State::Done(Termination::Exhausted)
        } else {
            State::SelectValue
        }
    }

    fn solution(&mut self, control: &SearchControl, hooks: &SolveHooks<'_>) -> Result<State, SolveError> {
        let Some(mapping) = self.complete_mapping() else {
            return Ok(self.resume());
        };

        if let Some(oracle) = hooks.oracle {
            if oracle.ask(&mapping)? == OracleVerdict::Reject {
                self.ctx.statistics.increment(Counters::OracleRejections);
                return Ok(self.resume());
            }
        }
        self.ctx.statistics.increment(Counters::Solutions);

        if self.counting {
            self.solution_count += 1;
            if let Some(sink) = hooks.sink {
                if !sink.accept(&mapping) {
                    control.stop();
                    return Ok(State::Done(Termination::Stopped));
                }
            }
            return Ok(self.resume());
        }

        if control.claim_solution() {
            self.mapping = Some(mapping);
            Ok(State::Done(Termination::Found))
        } else {
            Ok(State::Done(Termination::Stopped))
        }
    }

    /// The full mapping at a leaf: branching variables as assigned, set-aside
    /// vertices matched onto what is left, then checked from scratch.
    fn complete_mapping(&mut self) -> Option<Vec<(usize, usize)>> {
        let memo = self.ctx.memo;
        let store = &self.ctx.store;
        let mut images: Vec<Option<usize>> = (0..store.len()).map(|v| store.assigned(v)).collect();

        let unplaced: Vec<usize> = (0..store.len()).filter(|&v| images[v].is_none()).collect();
        if !unplaced.is_empty() {
            let Some(placed) = place_unassigned(store, &unplaced) else {
                trace!(isolated = unplaced.len(), "no room for isolated vertices");
                self.ctx.statistics.increment(Counters::ValidationFailures);
                return None;
            };
            for (v, t) in placed {
                images[v] = Some(t);
            }
        }

        let images: Vec<usize> = images.into_iter().flatten().collect();
        if let Err(reason) = verify_mapping(&memo.pattern, &memo.target, memo.induced, &images) {
            error!(%reason, "propagation accepted an invalid mapping");
            self.ctx.statistics.increment(Counters::ValidationFailures);
            return None;
        }
        Some(images.into_iter().enumerate().collect())
    }

    fn restart(&mut self, control: &SearchControl) -> State {
        self.ctx.statistics.increment(Counters::Restarts);
        if self.role == WorkerRole::Leader {
            self.seen_generation = control.broadcast_restart();
        } else {
            self.seen_generation = control.restart_generation();
        }
        if let Some(tx) = self.first_restart.take() {
            let _ = tx.try_send(());
        }

        // Every value already tried at a depth, under the decisions above it,
        // led nowhere.
        let mut decisions = Vec::with_capacity(self.frames.len());
        for frame in &self.frames {
            let Some(current) = frame.next.checked_sub(1) else { break };
            for &value in &frame.values[..current] {
                let mut nogood = decisions.clone();
                nogood.push((frame.var, value));
                self.ctx.nogoods.add(nogood);
                self.ctx.statistics.increment(Counters::Nogoods);
            }
            decisions.push((frame.var, frame.values[current]));
        }
        for &(_, value) in &decisions {
            self.orderer.reward(value);
        }

        self.frames.clear();
        self.ctx.store.undo_to(self.root_mark);
        self.restarts.did_restart();
        trace!(
            restarts = self.restarts.restarts(),
            nogoods = self.ctx.nogoods.len(),
            "restart"
        );

        match propagation::propagate_root(&mut self.ctx) {
            Ok(_) => State::SelectVariable,
            Err(failure) => {
                // the nogoods cover the whole tree
                self.ctx.statistics.record_failure(&failure);
                State::Done(Termination::Exhausted)
            }
        }
    }
}
