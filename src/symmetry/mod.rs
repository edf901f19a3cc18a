// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Pattern symmetry breaking.
//!
//! Symmetries of the pattern make the search find every solution once per
//! automorphism. Constraints `v < w` (the image of `v` has a lower target index
//! than the image of `w`) keep one representative per orbit. They come either
//! from the caller, as `"v<w"` strings over pattern vertex names, or from a
//! [`SymmetryOracle`].
//!
//! When solutions are counted under such constraints, the automorphism group
//! size converts the count back to the unbroken one.

pub mod automorphisms;

pub use automorphisms::EnumeratedSymmetries;

use tracing::debug;

use crate::bigraph::Bigraph;
use crate::config::SolverParams;
use crate::errors::SolveError;

/// Symmetry-breaking constraints for one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSymmetries {
    /// Pairs `(v, w)` requiring `image(v) < image(w)`.
    pub less_than: Vec<(usize, usize)>,
    /// Order of the automorphism group, as a decimal string.
    pub group_size: Option<String>,
}

/// Source of symmetry-breaking constraints.
pub trait SymmetryOracle: Send + Sync {
    fn pattern_symmetries(&self, pattern: &Bigraph) -> Result<PatternSymmetries, SolveError>;
}

/// Parse `"v<w"` over pattern vertex names.
pub fn parse_less_than(constraint: &str, pattern: &Bigraph) -> Result<(usize, usize), SolveError> {
    let Some((left, right)) = constraint.split_once('<') else {
        return Err(SolveError::constraint(constraint, "expected the form v<w"));
    };
    let lookup = |name: &str| {
        let name = name.trim();
        pattern
            .vertex_by_name(name)
            .ok_or_else(|| SolveError::constraint(constraint, format!("no pattern vertex named '{}'", name)))
    };
    let (v, w) = (lookup(left)?, lookup(right)?);
    if v == w {
        return Err(SolveError::constraint(constraint, "a vertex cannot precede itself"));
    }
    Ok((v, w))
}

/// Validate a group order given as a decimal string.
pub fn parse_group_size(text: &str) -> Result<String, SolveError> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SolveError::constraint(text, "group size must be a positive decimal integer"));
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Err(SolveError::constraint(text, "group size must be a positive decimal integer"));
    }
    Ok(digits.to_string())
}

/// The constraints in force for a solve: the caller's, plus the oracle's when
/// one is supplied.
pub fn resolve(
    params: &SolverParams,
    pattern: &Bigraph,
    oracle: Option<&dyn SymmetryOracle>,
) -> Result<PatternSymmetries, SolveError> {
    let mut resolved = PatternSymmetries::default();
    for constraint in &params.pattern_less_constraints {
        resolved.less_than.push(parse_less_than(constraint, pattern)?);
    }
    if let Some(size) = &params.pattern_automorphism_group_size {
        resolved.group_size = Some(parse_group_size(size)?);
    }
    if let Some(oracle) = oracle {
        let found = oracle.pattern_symmetries(pattern)?;
        debug!(
            constraints = found.less_than.len(),
            group_size = found.group_size.as_deref().unwrap_or("unknown"),
            "pattern symmetries"
        );
        resolved.less_than.extend(found.less_than);
        if resolved.group_size.is_none() {
            resolved.group_size = found.group_size;
        }
    }
    resolved.less_than.sort_unstable();
    resolved.less_than.dedup();
    Ok(resolved)
}

/// `count * group_size`, when it fits in a `u128`.
pub fn unbroken_count(count: u64, group_size: &str) -> Option<u128> {
    let size: u128 = group_size.parse().ok()?;
    u128::from(count).checked_mul(size)
}
