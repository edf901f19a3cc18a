// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The named-pipe oracle over plain files standing in for FIFOs.

mod common;

use std::fs;

use bigraph_match::{solve, NamedPipeOracle, SolveError, SolveHooks, SolverParams, ValueOrdering};

use common::loose;

#[test]
fn test_oracle_verdicts_steer_the_search() {
    let dir = tempfile::tempdir().unwrap();
    let send = dir.path().join("to-oracle");
    let receive = dir.path().join("from-oracle");
    fs::write(&receive, "no\nyes\n").unwrap();

    let pattern = loose("pattern", 1);
    let target = loose("target", 2);
    let oracle = NamedPipeOracle::open(&send, &receive, &pattern, &target).unwrap();
    let hooks = SolveHooks {
        oracle: Some(&oracle),
        ..SolveHooks::default()
    };
    let params = SolverParams {
        value_ordering: ValueOrdering::Degree,
        ..SolverParams::default()
    };
    let result = solve(&pattern, &target, &params, &hooks).unwrap();
    assert!(result.found);
    assert_eq!(result.mapping, vec![(0, 1)]);
    assert!(result.extra_stats.contains(&"oracle_rejections = 1".to_string()));

    drop(oracle);
    let sent = fs::read_to_string(&send).unwrap();
    assert_eq!(sent, "M 1 v0 v0\nM 1 v0 v1\n");
}

#[test]
fn test_silent_oracle_is_a_communication_error() {
    let dir = tempfile::tempdir().unwrap();
    let send = dir.path().join("to-oracle");
    let receive = dir.path().join("from-oracle");
    fs::write(&receive, "").unwrap();

    let pattern = loose("pattern", 1);
    let target = loose("target", 2);
    let oracle = NamedPipeOracle::open(&send, &receive, &pattern, &target).unwrap();
    let hooks = SolveHooks {
        oracle: Some(&oracle),
        ..SolveHooks::default()
    };
    let err = solve(&pattern, &target, &SolverParams::default(), &hooks).unwrap_err();
    assert!(matches!(err, SolveError::OracleCommunication { .. }));
}

#[test]
fn test_missing_pipe_is_a_communication_error() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = loose("pattern", 1);
    let target = loose("target", 1);
    let result = NamedPipeOracle::open(
        &dir.path().join("to-oracle"),
        &dir.path().join("does-not-exist"),
        &pattern,
        &target,
    );
    assert!(matches!(result, Err(SolveError::OracleCommunication { source: Some(_), .. })));
}
