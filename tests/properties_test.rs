// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Solver answers against brute-force enumeration on random small bigraphs.

mod common;

use std::sync::Mutex;

use bigraph_match::engine::verify_mapping;
use bigraph_match::{solve, SolveHooks, SolverParams};
use proptest::prelude::*;

use common::{bigraph_strategy, brute_force};

fn enumerate(
    pattern: &bigraph_match::Bigraph,
    target: &bigraph_match::Bigraph,
    params: &SolverParams,
) -> (u64, Vec<Vec<usize>>) {
    let seen = Mutex::new(Vec::new());
    let sink = |mapping: &[(usize, usize)]| {
        seen.lock().unwrap().push(mapping.iter().map(|&(_, t)| t).collect::<Vec<_>>());
        true
    };
    let hooks = SolveHooks {
        sink: Some(&sink),
        ..SolveHooks::default()
    };
    let result = solve(pattern, target, params, &hooks).unwrap();
    let mut seen = seen.into_inner().unwrap();
    seen.sort();
    (result.solution_count, seen)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(96))]

    #[test]
    fn test_enumeration_matches_brute_force(
        pattern in bigraph_strategy("p", 4),
        target in bigraph_strategy("t", 5),
        induced in any::<bool>(),
    ) {
        let params = SolverParams { induced, ..SolverParams::default() };
        let (count, seen) = enumerate(&pattern, &target, &params);
        let expected = brute_force(&pattern, &target, induced);
        prop_assert_eq!(count as usize, expected.len());
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn test_rule_toggles_do_not_change_counts(
        pattern in bigraph_strategy("p", 4),
        target in bigraph_strategy("t", 5),
        induced in any::<bool>(),
    ) {
        let mut params = SolverParams { induced, count_solutions: true, ..SolverParams::default() };
        let with_rules = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        params.rules.no_clique_detection = true;
        params.rules.no_supplementals = true;
        params.rules.no_nds = true;
        let without = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        prop_assert_eq!(with_rules.solution_count, without.solution_count);
    }

    #[test]
    fn test_found_mappings_are_valid(
        pattern in bigraph_strategy("p", 5),
        target in bigraph_strategy("t", 6),
        induced in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let params = SolverParams { induced, seed, ..SolverParams::default() };
        let result = solve(&pattern, &target, &params, &SolveHooks::default()).unwrap();
        let exists = !brute_force(&pattern, &target, induced).is_empty();
        prop_assert_eq!(result.found, exists);
        if result.found {
            let images: Vec<usize> = result.mapping.iter().map(|&(_, t)| t).collect();
            prop_assert_eq!(verify_mapping(&pattern, &target, induced, &images), Ok(()));
        }
    }
}
