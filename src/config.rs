// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Solver configuration.
//!
//! [`SolverParams`] is built once before a solve and then only read, by shared
//! reference, from every worker.

use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use tracing::warn;

use crate::errors::SolveError;
use crate::restarts::{Geometric, Luby, NoRestarts, RestartsSchedule, Timed};

pub const DEFAULT_LUBY_MULTIPLIER: u64 = 660;
pub const DEFAULT_GEOMETRIC_INITIAL: f64 = 5400.0;
pub const DEFAULT_GEOMETRIC_MULTIPLIER: f64 = 1.0;
pub const DEFAULT_RESTART_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_RESTART_MINIMUM: u64 = 100;

/// Order in which a chosen variable's candidate values are tried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrdering {
    /// Weighted random by target degree, boosted by values that previously led deep.
    #[default]
    Biased,
    /// Ascending target degree.
    Degree,
    /// Descending target degree.
    #[strum(to_string = "antidegree", serialize = "anti-degree")]
    AntiDegree,
    /// Uniform shuffle.
    Random,
}

impl ValueOrdering {
    pub fn from_name(name: &str) -> Result<Self, SolveError> {
        Self::from_str(name).map_err(|_| SolveError::UnknownPolicy {
            kind: "value ordering",
            name: name.to_string(),
        })
    }
}

/// Restart policy and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum RestartPolicy {
    Luby { multiplier: u64 },
    Geometric { initial_value: f64, multiplier: f64 },
    Timed { interval: Duration, minimum_backtracks: u64 },
    #[serde(rename = "none")]
    NoRestarts,
}

impl RestartPolicy {
    /// Policy by name, with default parameters.
    pub fn from_name(name: &str) -> Result<Self, SolveError> {
        match name.to_ascii_lowercase().as_str() {
            "luby" => Ok(RestartPolicy::Luby {
                multiplier: DEFAULT_LUBY_MULTIPLIER,
            }),
            "geometric" => Ok(RestartPolicy::Geometric {
                initial_value: DEFAULT_GEOMETRIC_INITIAL,
                multiplier: DEFAULT_GEOMETRIC_MULTIPLIER,
            }),
            "timed" => Ok(RestartPolicy::Timed {
                interval: DEFAULT_RESTART_INTERVAL,
                minimum_backtracks: DEFAULT_RESTART_MINIMUM,
            }),
            "none" => Ok(RestartPolicy::NoRestarts),
            _ => Err(SolveError::UnknownPolicy {
                kind: "restart policy",
                name: name.to_string(),
            }),
        }
    }

    pub fn build(&self) -> Box<dyn RestartsSchedule> {
        match *self {
            RestartPolicy::Luby { multiplier } => Box::new(Luby::new(multiplier)),
            RestartPolicy::Geometric {
                initial_value,
                multiplier,
            } => Box::new(Geometric::new(initial_value, multiplier)),
            RestartPolicy::Timed {
                interval,
                minimum_backtracks,
            } => Box::new(Timed::new(interval, minimum_backtracks)),
            RestartPolicy::NoRestarts => Box::new(NoRestarts),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RestartPolicy::Luby { .. } => "luby",
            RestartPolicy::Geometric { .. } => "geometric",
            RestartPolicy::Timed { .. } => "timed",
            RestartPolicy::NoRestarts => "none",
        }
    }
}

/// Independent switches for the optional filtering rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleToggles {
    pub no_clique_detection: bool,
    pub no_isolated_vertex_removal: bool,
    pub no_supplementals: bool,
    pub no_nds: bool,
}

/// Everything that shapes one solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Require non-adjacency and non-ancestry to be preserved as well.
    pub induced: bool,
    pub count_solutions: bool,
    /// `None` picks a default from the other settings.
    pub restarts: Option<RestartPolicy>,
    pub value_ordering: ValueOrdering,
    /// Worker threads; 0 means one per available core.
    pub n_threads: usize,
    pub triggered_restarts: bool,
    pub delay_thread_creation: bool,
    /// Constraints of the form `v<w` over pattern vertex names.
    pub pattern_less_constraints: Vec<String>,
    /// Decimal group size, reported and used for the symmetry-adjusted count.
    pub pattern_automorphism_group_size: Option<String>,
    pub rules: RuleToggles,
    /// Zero means no time limit.
    pub timeout: Duration,
    pub seed: u64,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            induced: true,
            count_solutions: false,
            restarts: None,
            value_ordering: ValueOrdering::default(),
            n_threads: 1,
            triggered_restarts: false,
            delay_thread_creation: false,
            pattern_less_constraints: Vec::new(),
            pattern_automorphism_group_size: None,
            rules: RuleToggles::default(),
            timeout: Duration::ZERO,
            seed: 0,
        }
    }
}

impl SolverParams {
    /// The restart policy actually used.
    ///
    /// Counting and enumeration never restart: a restart abandons partially counted
    /// subtrees that would be visited again.
    pub fn effective_restarts(&self, counting: bool) -> RestartPolicy {
        match (&self.restarts, counting) {
            (Some(RestartPolicy::NoRestarts), _) => RestartPolicy::NoRestarts,
            (Some(policy), true) => {
                warn!(policy = policy.name(), "restarts disabled while counting solutions");
                RestartPolicy::NoRestarts
            }
            (None, true) => RestartPolicy::NoRestarts,
            (Some(policy), false) => policy.clone(),
            (None, false) if self.n_threads != 1 => RestartPolicy::Timed {
                interval: DEFAULT_RESTART_INTERVAL,
                minimum_backtracks: DEFAULT_RESTART_MINIMUM,
            },
            (None, false) => RestartPolicy::Luby {
                multiplier: DEFAULT_LUBY_MULTIPLIER,
            },
        }
    }

    /// Worker count with 0 resolved to the machine's parallelism.
    pub fn threads(&self) -> usize {
        match self.n_threads {
            0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ordering_names() {
        assert_eq!(ValueOrdering::from_name("Biased").unwrap(), ValueOrdering::Biased);
        assert_eq!(ValueOrdering::from_name("antidegree").unwrap(), ValueOrdering::AntiDegree);
        assert_eq!(ValueOrdering::from_name("anti-degree").unwrap(), ValueOrdering::AntiDegree);
        assert_eq!(ValueOrdering::from_name("RANDOM").unwrap(), ValueOrdering::Random);
        assert_eq!(ValueOrdering::AntiDegree.to_string(), "antidegree");
        assert!(matches!(
            ValueOrdering::from_name("sideways"),
            Err(SolveError::UnknownPolicy { kind: "value ordering", .. })
        ));
    }

    #[test]
    fn test_restart_policy_names_and_defaults() {
        assert_eq!(
            RestartPolicy::from_name("Luby").unwrap(),
            RestartPolicy::Luby { multiplier: 660 }
        );
        assert_eq!(
            RestartPolicy::from_name("timed").unwrap(),
            RestartPolicy::Timed {
                interval: Duration::from_millis(100),
                minimum_backtracks: 100
            }
        );
        assert_eq!(RestartPolicy::from_name("none").unwrap(), RestartPolicy::NoRestarts);
        assert!(RestartPolicy::from_name("often").is_err());
    }

    #[test]
    fn test_counting_forces_no_restarts() {
        let params = SolverParams {
            restarts: Some(RestartPolicy::from_name("luby").unwrap()),
            ..SolverParams::default()
        };
        assert_eq!(params.effective_restarts(true), RestartPolicy::NoRestarts);
        assert_eq!(params.effective_restarts(false).name(), "luby");
    }

    #[test]
    fn test_default_policy_depends_on_threads() {
        let single = SolverParams::default();
        assert_eq!(single.effective_restarts(false).name(), "luby");
        let parallel = SolverParams {
            n_threads: 0,
            ..SolverParams::default()
        };
        assert_eq!(parallel.effective_restarts(false).name(), "timed");
        assert!(parallel.threads() >= 1);
    }

    #[test]
    fn test_params_round_trip_through_json() {
        let params = SolverParams {
            restarts: Some(RestartPolicy::Geometric {
                initial_value: 10.0,
                multiplier: 2.0,
            }),
            value_ordering: ValueOrdering::AntiDegree,
            ..SolverParams::default()
        };
        let json = serde_json::to_string(&params).unwrap();
        let back: SolverParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
