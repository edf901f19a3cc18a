// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! End-to-end searches through [`solve`].

mod common;

use std::sync::Mutex;

use bigraph_match::engine::verify_mapping;
use bigraph_match::{
    solve, solve_with_timeout, BigraphBuilder, BigraphDocument, OracleVerdict, RestartPolicy, SolveError, SolveHooks,
    SolverParams, Timeout, ValueOrdering,
};

use common::{linked_parent_child, loose, ring};

fn counting() -> SolverParams {
    SolverParams {
        count_solutions: true,
        ..SolverParams::default()
    }
}

#[test]
fn test_single_vertex_into_two_isolated_vertices() {
    let pattern = loose("pattern", 1);
    let target = loose("target", 2);

    let result = solve(&pattern, &target, &SolverParams::default(), &SolveHooks::default()).unwrap();
    assert!(result.found);
    assert_eq!(result.mapping.len(), 1);
    assert_eq!(result.mapping[0].0, 0);

    let result = solve(&pattern, &target, &counting(), &SolveHooks::default()).unwrap();
    assert_eq!(result.solution_count, 2);
    assert!(result.mapping.is_empty());
}

#[test]
fn test_isolated_vertices_are_placed_after_search() {
    // not induced and not counting: the loose vertices skip branching
    let params = SolverParams {
        induced: false,
        ..SolverParams::default()
    };
    let result = solve(&loose("pattern", 3), &loose("target", 4), &params, &SolveHooks::default()).unwrap();
    assert!(result.found);
    let images: Vec<usize> = result.mapping.iter().map(|&(_, t)| t).collect();
    assert_eq!(images.len(), 3);
    assert_eq!(
        verify_mapping(&loose("pattern", 3), &loose("target", 4), false, &images),
        Ok(())
    );
}

#[test]
fn test_linked_parent_child_needs_both_relations() {
    let pattern = linked_parent_child("pattern");
    // p1 is the parent of c1 but they are not linked; a2 and b2 are linked but unrelated
    let mut b = BigraphBuilder::new("target");
    let p1 = b.add_vertex("p1", "A", 1);
    let c1 = b.add_vertex("c1", "A", 1);
    let a2 = b.add_vertex("a2", "A", 1);
    let b2 = b.add_vertex("b2", "A", 1);
    b.set_parent(c1, p1);
    b.add_link(&[(a2, 0), (b2, 0)]);
    let target = b.build().unwrap();

    for induced in [true, false] {
        let params = SolverParams {
            induced,
            ..SolverParams::default()
        };
        let result = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        assert!(!result.found, "induced = {}", induced);
        assert!(result.mapping.is_empty());

        let params = SolverParams { induced, ..counting() };
        let result = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        assert_eq!(result.solution_count, 0);
    }
}

#[test]
fn test_linked_parent_child_found_when_present() {
    let pattern = linked_parent_child("pattern");
    let target = linked_parent_child("target");
    let result = solve(&pattern, &target, &SolverParams::default(), &SolveHooks::default()).unwrap();
    assert!(result.found);
    assert_eq!(result.mapping, vec![(0, 0), (1, 1)]);
}

#[test]
fn test_oracle_rejecting_everything_blocks_all_mappings() {
    let reject = |_: &[(usize, usize)]| Ok::<_, SolveError>(OracleVerdict::Reject);
    let hooks = SolveHooks {
        oracle: Some(&reject),
        ..SolveHooks::default()
    };
    let pattern = ring("pattern", 3);
    let target = ring("target", 3);

    let result = solve(&pattern, &target, &SolverParams::default(), &hooks).unwrap();
    assert!(!result.found);
    assert!(!result.aborted);

    let result = solve(&pattern, &target, &counting(), &hooks).unwrap();
    assert_eq!(result.solution_count, 0);
    assert!(result.extra_stats.contains(&"oracle_rejections = 3".to_string()));
}

#[test]
fn test_oracle_sees_every_placement_of_loose_vertices() {
    let only_second = |m: &[(usize, usize)]| {
        Ok::<_, SolveError>(if *m == [(0, 1)] {
            OracleVerdict::Accept
        } else {
            OracleVerdict::Reject
        })
    };
    let hooks = SolveHooks {
        oracle: Some(&only_second),
        ..SolveHooks::default()
    };
    let params = SolverParams {
        induced: false,
        ..SolverParams::default()
    };
    let result = solve(&loose("pattern", 1), &loose("target", 2), &params, &hooks).unwrap();
    assert!(result.found);
    assert_eq!(result.mapping, vec![(0, 1)]);
}

#[test]
fn test_unrelated_roots_embed_into_nested_pair() {
    let mut b = BigraphBuilder::new("target");
    let a = b.add_vertex("a", "A", 0);
    let child = b.add_vertex("b", "A", 0);
    b.set_parent(child, a);
    let target = b.build().unwrap();
    let pattern = loose("pattern", 2);

    let result = solve(&pattern, &target, &SolverParams::default(), &SolveHooks::default()).unwrap();
    assert!(result.found);
    let result = solve(&pattern, &target, &counting(), &SolveHooks::default()).unwrap();
    assert_eq!(result.solution_count, 2);
}

#[test]
fn test_oracle_error_aborts_the_solve() {
    let broken = |_: &[(usize, usize)]| -> Result<OracleVerdict, SolveError> {
        Err(bigraph_match::oracle::pipe::parse_verdict("garbage").unwrap_err())
    };
    let hooks = SolveHooks {
        oracle: Some(&broken),
        ..SolveHooks::default()
    };
    let err = solve(&ring("pattern", 3), &ring("target", 3), &SolverParams::default(), &hooks).unwrap_err();
    assert!(matches!(err, SolveError::OracleCommunication { .. }));
}

#[test]
fn test_expired_timeout_reports_aborted() {
    let pattern = ring("pattern", 5);
    let target = ring("target", 6);
    let result = solve_with_timeout(
        &pattern,
        &target,
        &SolverParams::default(),
        &SolveHooks::default(),
        Timeout::expired(),
    )
    .unwrap();
    assert!(result.aborted);
    assert!(!result.found);
    assert_eq!(result.nodes, 1);
}

#[test]
fn test_unsatisfiable_without_timeout_is_not_aborted() {
    let result = solve(
        &ring("pattern", 5),
        &ring("target", 6),
        &SolverParams::default(),
        &SolveHooks::default(),
    )
    .unwrap();
    assert!(!result.found);
    assert!(!result.aborted);
}

#[test]
fn test_single_thread_runs_are_deterministic() {
    let pattern = ring("pattern", 4);
    let mut b = BigraphBuilder::new("target");
    for i in 0..10 {
        b.add_vertex(&format!("t{}", i), "A", 2);
    }
    for i in 0..4 {
        b.add_link(&[(i, 1), ((i + 1) % 4, 0)]);
    }
    for i in 0..6 {
        b.add_link(&[(4 + i, 1), (4 + (i + 1) % 6, 0)]);
    }
    let target = b.build().unwrap();

    for ordering in [ValueOrdering::Biased, ValueOrdering::Degree, ValueOrdering::AntiDegree] {
        let params = SolverParams {
            value_ordering: ordering,
            seed: 17,
            ..SolverParams::default()
        };
        let first = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        let second = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        assert!(first.found);
        assert_eq!(first.mapping, second.mapping);
        assert_eq!(first.nodes, second.nodes);
        assert_eq!(first.propagations, second.propagations);
    }
}

#[test]
fn test_sink_sees_every_counted_mapping() {
    let pattern = ring("pattern", 3);
    let mut b = BigraphBuilder::new("target");
    for i in 0..6 {
        b.add_vertex(&format!("t{}", i), "A", 2);
    }
    for ring_start in [0, 3] {
        for i in 0..3 {
            b.add_link(&[(ring_start + i, 1), (ring_start + (i + 1) % 3, 0)]);
        }
    }
    let target = b.build().unwrap();

    let seen = Mutex::new(Vec::new());
    let sink = |mapping: &[(usize, usize)]| {
        seen.lock().unwrap().push(mapping.to_vec());
        true
    };
    let hooks = SolveHooks {
        sink: Some(&sink),
        ..SolveHooks::default()
    };
    let result = solve(&pattern, &target, &SolverParams::default(), &hooks).unwrap();
    // three rotations onto each of the two rings
    assert_eq!(result.solution_count, 6);
    let mut seen = seen.into_inner().unwrap();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 6);
}

#[test]
fn test_counting_ignores_requested_restarts() {
    let params = SolverParams {
        restarts: Some(RestartPolicy::Luby { multiplier: 1 }),
        ..counting()
    };
    let result = solve(&ring("pattern", 4), &ring("target", 4), &params, &SolveHooks::default()).unwrap();
    assert_eq!(result.solution_count, 4);
    assert!(result.extra_stats.contains(&"restarts = 0".to_string()));
}

#[test]
fn test_rule_toggles_keep_answers() {
    let pattern = ring("pattern", 3);
    let target = ring("target", 3);
    let mut params = counting();
    params.rules.no_clique_detection = true;
    params.rules.no_supplementals = true;
    params.rules.no_nds = true;
    params.rules.no_isolated_vertex_removal = true;
    let result = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
    assert_eq!(result.solution_count, 3);
}

#[test]
fn test_documents_drive_a_solve() {
    let pattern = BigraphDocument::parse(
        r#"{
            "vertices": [
                {"name": "room", "label": "Room", "arity": 0},
                {"name": "agent", "label": "Agent", "arity": 1, "parent": "room"}
            ]
        }"#,
        "pattern",
    )
    .unwrap();
    let target = BigraphDocument::parse(
        r#"{
            "vertices": [
                {"name": "building", "label": "Building", "arity": 0},
                {"name": "r1", "label": "Room", "arity": 0, "parent": "building"},
                {"name": "r2", "label": "Room", "arity": 0, "parent": "building"},
                {"name": "a", "label": "Agent", "arity": 1, "parent": "r2"}
            ],
            "links": [{"name": "phone", "ports": [{"vertex": "a", "port": 0}]}]
        }"#,
        "target",
    )
    .unwrap();
    let params = SolverParams {
        induced: false,
        ..SolverParams::default()
    };
    let result = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
    assert!(result.found);
    let names: Vec<&str> = result.mapping.iter().map(|&(_, t)| target.name(t)).collect();
    assert_eq!(names, vec!["r2", "a"]);
}

#[test]
fn test_malformed_document_is_rejected() {
    let err = BigraphDocument::parse(
        r#"{"vertices": [{"name": "x", "label": "A", "arity": 0, "parent": "y"}]}"#,
        "pattern",
    )
    .unwrap_err();
    assert!(matches!(err, SolveError::MalformedBigraph { .. }));
}
